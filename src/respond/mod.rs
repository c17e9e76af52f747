// Respond module
// Reply assembly and the guide questions it draws on

mod assembler;
mod guide;

pub use assembler::{Reply, ResponseAssembler, ResponseSource};
pub use guide::{GuideBook, GuideQuestion};
