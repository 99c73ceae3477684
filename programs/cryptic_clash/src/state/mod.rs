pub mod arena;
pub mod handles;
pub mod owner_record;
pub mod soldier;

pub use arena::*;
pub use handles::*;
pub use owner_record::*;
pub use soldier::*;
