/// Presentation layer
///
/// Pure view builders over the controller state. Nothing here mutates
/// anything; every gesture and scroll change flows back as a `Message`.

pub mod grid;
pub mod overlay;
