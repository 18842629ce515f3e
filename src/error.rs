#[derive(thiserror::Error, Debug)]
pub enum FractransError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Input(#[from] crate::io::InputError),
    #[error(transparent)]
    Grid(#[from] crate::grid::GridError),
    #[error(transparent)]
    Fracture(#[from] crate::fracture::FractureError),
}
