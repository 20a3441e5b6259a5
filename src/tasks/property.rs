//! `<property>`

use crate::bind::{Element, Schema, Validator};
use crate::plugin::Task;
use crate::runner::Context;

/// Set a property, or import the process environment under a prefix
#[derive(Debug, Default)]
pub struct PropertyTask {
    name: Option<String>,
    value: Option<String>,
    dynamic: bool,
    overwrite: bool,
    read_only: bool,
    environment: Option<String>,
}

impl Element for PropertyTask {
    fn schema() -> Schema<Self> {
        Schema::<Self>::new()
            .string("name", |t, v| t.name = Some(v))
            .validate(Validator::NonEmpty)
            // expanded in execute, unless dynamic
            .string("value", |t, v| t.value = Some(v))
            .no_expand()
            .boolean("dynamic", |t, v| t.dynamic = v)
            .boolean("overwrite", |t, v| t.overwrite = v)
            .boolean("readonly", |t, v| t.read_only = v)
            .string("environment", |t, v| t.environment = Some(v))
            .validate(Validator::NonEmpty)
    }
}

impl PropertyTask {
    fn import_environment(&self, prefix: &str, ctx: &mut Context<'_>) {
        let prefix = prefix.trim_end_matches('.');
        let mut count = 0;
        for (key, value) in std::env::vars() {
            if ctx.properties.set(format!("{}.{}", prefix, key), value, self.overwrite) {
                count += 1;
            }
        }
        ctx.verbose(format!("Imported {} environment variables as {}.*", count, prefix));
    }
}

impl Task for PropertyTask {
    fn execute(&mut self, ctx: &mut Context<'_>) -> anyhow::Result<()> {
        if let Some(prefix) = self.environment.clone() {
            self.import_environment(&prefix, ctx);
            if self.name.is_none() {
                return Ok(());
            }
        }

        let Some(name) = self.name.clone() else {
            anyhow::bail!("either 'name' or 'environment' must be set");
        };
        let text = self.value.clone().unwrap_or_default();

        if self.overwrite && ctx.properties.is_read_only(&name) {
            ctx.warn(format!("Read-only property '{}' cannot be overwritten", name));
            return Ok(());
        }

        let changed = if self.dynamic {
            ctx.properties.set_dynamic(name.as_str(), text, self.overwrite)
        } else {
            let value = ctx.properties.expand(&text)?;
            ctx.properties.set(name.as_str(), value, self.overwrite)
        };

        if changed {
            if self.read_only {
                ctx.properties.mark_read_only(&name);
            }
            ctx.verbose(format!("Set property {}", name));
        } else {
            tracing::debug!(property = %name, "property already set");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::tasks::testing::{element, TaskFixture};
    use crate::ui::Level;

    fn property(name: &str, value: &str) -> crate::config::XmlElement {
        element("property")
            .with_attribute("name", name)
            .with_attribute("value", value)
    }

    #[test]
    fn test_first_declaration_wins() {
        let mut fixture = TaskFixture::new();
        fixture.run(&property("a", "1")).unwrap();
        fixture.run(&property("a", "2")).unwrap();
        assert_eq!(fixture.value("a").as_deref(), Some("1"));

        fixture
            .run(&property("a", "3").with_attribute("overwrite", "true"))
            .unwrap();
        assert_eq!(fixture.value("a").as_deref(), Some("3"));
    }

    #[test]
    fn test_eager_value_is_expanded_once() {
        let mut fixture = TaskFixture::new();
        fixture.run(&property("base", "/opt")).unwrap();
        fixture.run(&property("bin", "${base}/bin")).unwrap();
        fixture
            .run(&property("base", "/usr").with_attribute("overwrite", "true"))
            .unwrap();
        assert_eq!(fixture.value("bin").as_deref(), Some("/opt/bin"));
    }

    #[test]
    fn test_dynamic_value_tracks_changes() {
        let mut fixture = TaskFixture::new();
        fixture.run(&property("base", "/opt")).unwrap();
        fixture
            .run(&property("bin", "${base}/bin").with_attribute("dynamic", "true"))
            .unwrap();
        fixture
            .run(&property("base", "/usr").with_attribute("overwrite", "true"))
            .unwrap();
        assert_eq!(fixture.value("bin").as_deref(), Some("/usr/bin"));
    }

    #[test]
    fn test_read_only_property_is_not_overwritten() {
        let mut fixture = TaskFixture::new();
        fixture
            .run(&property("version", "1.0").with_attribute("readonly", "true"))
            .unwrap();
        fixture
            .run(&property("version", "2.0").with_attribute("overwrite", "true"))
            .unwrap();

        assert_eq!(fixture.value("version").as_deref(), Some("1.0"));
        assert_eq!(fixture.recorder.messages(Level::Warning).len(), 1);
    }

    #[test]
    fn test_missing_reference_fails() {
        let mut fixture = TaskFixture::new();
        let err = fixture.run(&property("a", "${missing}")).unwrap_err();
        assert!(format!("{}", err).contains("missing"));
        assert!(fixture.value("a").is_none());
    }

    #[test]
    fn test_environment_import() {
        std::env::set_var("ANTLER_PROPERTY_TEST", "present");
        let mut fixture = TaskFixture::new();
        fixture
            .run(&element("property").with_attribute("environment", "env"))
            .unwrap();
        assert_eq!(
            fixture.value("env.ANTLER_PROPERTY_TEST").as_deref(),
            Some("present")
        );
    }

    #[test]
    fn test_requires_name_or_environment() {
        assert!(TaskFixture::new().run(&element("property")).is_err());
    }
}
