use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum QuadtreeError {
    #[error("rectangle must be finite and non-negative (x: {x}, y: {y}, w: {width}, h: {height})")]
    InvalidRectangleDims {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    #[error("item handle {index}:{generation} does not refer to a live item")]
    StaleHandle { index: u32, generation: u32 },
    #[error("item handle {index}:{generation} is already inserted in the tree")]
    AlreadyInserted { index: u32, generation: u32 },
}

pub type QuadtreeResult<T> = Result<T, QuadtreeError>;
