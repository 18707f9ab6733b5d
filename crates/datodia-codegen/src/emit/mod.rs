//! Source emission.
//!
//! Rendering is plain string assembly and never fails.

mod builder;
mod container;
mod tree;

pub use builder::{builder_hint_name, render_record_builder_source};
pub use container::{
    CONTAINER_HINT_NAME, instance_name, render_container_source, render_dispatch_entry,
    render_instance_declaration,
};
pub use tree::{MODULE_TREE_FILE, render_module_tree};
