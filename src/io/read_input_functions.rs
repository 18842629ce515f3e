use std::path::Path;
use std::str::FromStr;

use text_io::try_read;

use super::InputError;

/// Keyword input file held in memory
///
/// Every value follows its `name:` keyword, separated by white space.
/// Vectors are written as `{a,b,c}`.
pub struct InputReader {
    content: Vec<u8>,
}

/// Next white space separated word, empty at the end of the input.
fn next_word(mut bytes: &mut dyn Iterator<Item = u8>) -> String {
    let word: Result<String, text_io::Error> = try_read!("{}", bytes);
    word.unwrap_or_default()
}

fn variable_name(search: &str) -> String {
    search.trim_end_matches(':').to_string()
}

fn parse_word<T: FromStr>(word: &str, name: &str) -> Result<T, InputError> {
    word.parse().map_err(|_| InputError::InvalidValue {
        name: variable_name(name),
        value: word.to_string(),
    })
}

impl InputReader {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, InputError> {
        Ok(Self {
            content: std::fs::read(path)?,
        })
    }

    pub fn from_text(text: &str) -> Self {
        Self {
            content: text.as_bytes().to_vec(),
        }
    }

    // Searches for a word and returns the input right after it
    fn search_var(&self, search: &str) -> Option<impl Iterator<Item = u8> + '_> {
        let mut bytes = self.content.iter().copied();

        loop {
            let word = next_word(&mut bytes);
            if word == search {
                return Some(bytes);
            } else if word.is_empty() {
                return None;
            }
        }
    }

    /// Read the value following the keyword `name`
    ///
    /// # Arguments
    ///
    /// * `name` - Keyword including the trailing colon, e.g. `"wellDepth:"`
    /// * `value` - OUTPUT. Variable to store the value
    pub fn read_value<T: ReadFromTextFile>(
        &self,
        name: &str,
        value: &mut T,
    ) -> Result<(), InputError> {
        let mut bytes = self
            .search_var(name)
            .ok_or_else(|| InputError::VariableNotFound(variable_name(name)))?;
        value.read_from_text(&mut bytes, name)
    }

    /// Same as [`InputReader::read_value`], but a missing keyword leaves
    /// `value` untouched. Returns whether the keyword was found.
    pub fn read_optional_value<T: ReadFromTextFile>(
        &self,
        name: &str,
        value: &mut T,
    ) -> Result<bool, InputError> {
        match self.search_var(name) {
            Some(mut bytes) => {
                value.read_from_text(&mut bytes, name)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

pub trait ReadFromTextFile {
    fn read_from_text(
        &mut self,
        bytes: &mut dyn Iterator<Item = u8>,
        name: &str,
    ) -> Result<(), InputError>;
}

/// Values read from a single word.
trait ScalarValue {}
impl ScalarValue for usize {}
impl ScalarValue for f64 {}
impl ScalarValue for String {}

impl<T> ReadFromTextFile for T
where
    T: FromStr + ScalarValue,
{
    fn read_from_text(
        &mut self,
        bytes: &mut dyn Iterator<Item = u8>,
        name: &str,
    ) -> Result<(), InputError> {
        *self = parse_word(&next_word(bytes), name)?;
        Ok(())
    }
}

impl<T> ReadFromTextFile for Vec<T>
where
    T: FromStr + ScalarValue,
{
    fn read_from_text(
        &mut self,
        bytes: &mut dyn Iterator<Item = u8>,
        name: &str,
    ) -> Result<(), InputError> {
        // Allow white space after the commas
        let mut text = next_word(bytes);
        while !text.ends_with('}') {
            let word = next_word(bytes);
            if word.is_empty() {
                break;
            }
            text.push_str(&word);
        }

        let items = text
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
            .ok_or_else(|| InputError::InvalidValue {
                name: variable_name(name),
                value: text.clone(),
            })?;

        *self = items
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| parse_word(s, name))
            .collect::<Result<Vec<T>, _>>()?;
        Ok(())
    }
}

impl<T> ReadFromTextFile for [T; 3]
where
    T: FromStr + ScalarValue,
{
    fn read_from_text(
        &mut self,
        bytes: &mut dyn Iterator<Item = u8>,
        name: &str,
    ) -> Result<(), InputError> {
        let mut values: Vec<T> = Vec::new();
        values.read_from_text(bytes, name)?;

        let actual = values.len();
        *self = values.try_into().map_err(|_| InputError::WrongLength {
            name: variable_name(name),
            expected: 3,
            actual,
        })?;
        Ok(())
    }
}
