pub mod convert;
mod project_root;
