//! Component definitions and instance trees
//!
//! Components are defined once, in files whose single root tag names the
//! component and whose inner content is the template:
//!
//! ```text
//! <greeting xmlns="urn:staticgen:components">
//!     <div class="greeting"><h1>Hello, {{Name}}!</h1>{{Children}}</div>
//! </greeting>
//! ```
//!
//! Pages then use them as namespaced tags:
//!
//! ```text
//! <c:greeting name="World"><p>Welcome!</p></c:greeting>
//! ```

mod instance;
mod registry;

pub use instance::{
    build_fragment, build_instances, reconstruct_html, ComponentInstance, Instance, NodeKind,
    Slots, SLOT_ATTR,
};
pub use registry::{
    Definition, DefinitionLoadError, Registry, RegistryBuilder, DEFINITION_EXTENSIONS,
};
