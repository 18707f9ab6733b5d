//! Container source generation.

use crate::model::{BuilderDefinition, GeneratedSource};

/// Hint name of the container source.
pub const CONTAINER_HINT_NAME: &str = "container.rs";

const INSTANCES_MARKER: &str = "[[#[[TYPE_BUILDERS_INSTANCES]]#]]";
const MAP_MARKER: &str = "[[#[[TYPE_BUILDERS_MAP]]#]]";

const CONTAINER_TEMPLATE: &str = r#"/// Creates values of every type a builder is known for.
pub struct Container {
    type_builders: ::std::collections::HashMap<::std::any::TypeId, ::datodia::Factory<Container>>,
    /// Number of elements [`Container::create_many`] produces.
    pub repeat_count: usize,
}

[[#[[TYPE_BUILDERS_INSTANCES]]#]]

impl Container {
    /// Create a container with every discovered builder registered.
    pub fn new() -> Self {
        let mut type_builders = ::std::collections::HashMap::new();
[[#[[TYPE_BUILDERS_MAP]]#]]
        Self {
            type_builders,
            repeat_count: ::datodia::DEFAULT_REPEAT_COUNT,
        }
    }

    /// Create a value of type `T`.
    pub fn create<T: 'static>(&self) -> ::datodia::Result<T> {
        match self.type_builders.get(&::std::any::TypeId::of::<T>()) {
            Some(builder) => ::datodia::downcast(builder(self)?),
            None => Err(::datodia::Error::not_registered::<T>()),
        }
    }

    /// Create `repeat_count` values of type `T`.
    pub fn create_many<T: 'static>(&self) -> ::datodia::Result<::std::vec::Vec<T>> {
        (0..self.repeat_count).map(|_| self.create::<T>()).collect()
    }

    /// Register `builder` for `T`, replacing any existing builder.
    pub fn register<T, F>(&mut self, builder: F) -> &mut Self
    where
        T: 'static,
        F: Fn(&Container) -> ::datodia::Result<T> + Send + Sync + 'static,
    {
        self.type_builders
            .insert(::std::any::TypeId::of::<T>(), ::datodia::factory(builder));
        self
    }
}

impl ::std::default::Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl ::datodia::Create for Container {
    fn create<T: 'static>(&self) -> ::datodia::Result<T> {
        Container::create::<T>(self)
    }

    fn create_many<T: 'static>(&self) -> ::datodia::Result<::std::vec::Vec<T>> {
        Container::create_many::<T>(self)
    }
}
"#;

/// Identifier of the static holding the builder instance, e.g.
/// `GENERATED_MODELS_CITYTYPEBUILDER_INSTANCE`.
pub fn instance_name(definition: &BuilderDefinition) -> String {
    let namespace = definition.namespace.trim_start_matches("::");
    let path = if namespace.is_empty() {
        definition.builder_name.clone()
    } else {
        format!("{}::{}", namespace, definition.builder_name)
    };

    format!("{}_INSTANCE", path.replace("::", "_").to_uppercase())
}

/// One `static` declaring the lazily constructed builder instance.
pub fn render_instance_declaration(definition: &BuilderDefinition) -> String {
    let builder = definition.builder_path();
    format!(
        "static {}: ::std::sync::LazyLock<{}> = \
         ::std::sync::LazyLock::new(<{} as ::std::default::Default>::default);",
        instance_name(definition),
        builder,
        builder
    )
}

/// One dispatch-table insertion mapping the produced type to its builder.
///
/// An earlier entry for the same type is kept.
pub fn render_dispatch_entry(definition: &BuilderDefinition) -> String {
    let ty = &definition.full_type_name;
    format!(
        "type_builders.entry(::std::any::TypeId::of::<{ty}>()).or_insert_with(|| \
         ::datodia::factory(|container: &Container| \
         <{} as ::datodia::TypeBuilder<{ty}>>::create(&*{}, container)));",
        definition.builder_path(),
        instance_name(definition)
    )
}

/// Render the container for `definitions`, in order.
pub fn render_container_source(definitions: &[BuilderDefinition]) -> GeneratedSource {
    let instances: String = definitions
        .iter()
        .map(|definition| format!("{}\n", render_instance_declaration(definition)))
        .collect();
    let entries: String = definitions
        .iter()
        .map(|definition| format!("        {}\n", render_dispatch_entry(definition)))
        .collect();

    let text = CONTAINER_TEMPLATE
        .replace(&format!("{INSTANCES_MARKER}\n"), &instances)
        .replace(&format!("{MAP_MARKER}\n"), &entries);

    GeneratedSource {
        hint_name: CONTAINER_HINT_NAME.to_string(),
        module_path: Vec::new(),
        text,
    }
}
