//! Record builder source generation.

use crate::model::{BuilderDefinition, Constructor, GeneratedSource};

/// Hint name of a builder source, e.g. `generated.models.CityTypeBuilder.rs`.
pub fn builder_hint_name(definition: &BuilderDefinition) -> String {
    if definition.namespace.is_empty() {
        format!("{}.rs", definition.builder_name)
    } else {
        format!(
            "{}.{}.rs",
            definition.namespace.trim_start_matches("::").replace("::", "."),
            definition.builder_name
        )
    }
}

/// Render the builder struct for a record definition.
///
/// The builder asks the container for every field, in declaration order.
pub fn render_record_builder_source(definition: &BuilderDefinition) -> GeneratedSource {
    let ty = &definition.full_type_name;
    let constructor = definition.constructor.as_ref().unwrap_or(&Constructor::Unit);

    let (container_param, body) = match constructor {
        Constructor::Unit => ("_container", ty.clone()),
        Constructor::Tuple(params) => {
            let mut body = format!("{ty}(\n");
            for param in params {
                body.push_str(&format!(
                    "            container.create::<{}>()?,\n",
                    param.ty
                ));
            }
            body.push_str("        )");
            ("container", body)
        }
        Constructor::Named(params) => {
            let mut body = format!("{ty} {{\n");
            for param in params {
                body.push_str(&format!(
                    "            {}: container.create::<{}>()?,\n",
                    param.name, param.ty
                ));
            }
            body.push_str("        }");
            ("container", body)
        }
    };

    let mut code = String::new();
    code.push_str(&format!("/// Builds [`{ty}`] values.\n"));
    code.push_str("#[::datodia::type_builder]\n");
    code.push_str("#[derive(Debug, Default, Clone, Copy)]\n");
    code.push_str(&format!("pub struct {};\n\n", definition.builder_name));
    code.push_str(&format!(
        "impl ::datodia::TypeBuilder<{ty}> for {} {{\n",
        definition.builder_name
    ));
    code.push_str(&format!(
        "    fn create<C: ::datodia::Create>(&self, {container_param}: &C) \
         -> ::datodia::Result<{ty}> {{\n"
    ));
    code.push_str(&format!("        Ok({body})\n"));
    code.push_str("    }\n");
    code.push_str("}\n");

    GeneratedSource {
        hint_name: builder_hint_name(definition),
        module_path: definition
            .namespace
            .split("::")
            .filter(|segment| !segment.is_empty())
            .map(str::to_owned)
            .collect(),
        text: code,
    }
}
