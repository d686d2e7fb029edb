pub mod block;
mod scalars;
mod uuid;
pub mod variable;
pub mod vector;
