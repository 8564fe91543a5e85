/// Errors raised while building a detector.
///
/// Detection itself never fails: an empty result is a normal outcome.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error("template image is empty")]
    EmptyTemplate,
    #[error("template image has zero variance")]
    FlatTemplate,
    #[error(transparent)]
    Image(#[from] image::ImageError),
}
