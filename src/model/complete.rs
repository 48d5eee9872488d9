//! Completion pass
//!
//! Runs every facet's `pre_complete` hook over the whole model, facet by
//! facet in registration order, then the `post_complete` hooks in the same
//! order, then verifies the model. After completion the model is read-only.

use tracing::debug;

use super::container::CharacteristicContainer;
use super::inheritance::InheritableCharacteristicContainer;
use super::Repository;
use crate::error::{ModelError, Result};
use crate::facet::FacetKey;

#[derive(Debug, Clone, Copy)]
enum Stage {
    Pre,
    Post,
}

impl Repository {
    /// Resolve the model. Runs exactly once.
    pub fn complete(&mut self) -> Result<()> {
        self.ensure_open()?;
        let keys = self.registry.keys();
        for stage in [Stage::Pre, Stage::Post] {
            for &key in &keys {
                debug!(facet = key, stage = ?stage, "Running completion hooks");
                self.run_hooks(key, stage)?;
            }
        }
        self.verify()?;
        self.completed = true;
        debug!(repository = %self.name(), "Model completed");
        Ok(())
    }

    fn run_hooks(&mut self, key: FacetKey, stage: Stage) -> Result<()> {
        // Elements defined by a hook are visited by the next stage.
        for element in self.elements()? {
            let Some(mut view) = self.facets_mut(element)?.take_enabled(key) else {
                continue;
            };
            let outcome = match stage {
                Stage::Pre => view.pre_complete(self, element),
                Stage::Post => view.post_complete(self, element),
            };
            self.facets_mut(element)?.restore(key, view);
            outcome?;
        }
        Ok(())
    }

    /// Structural checks that only make sense once construction is over
    pub fn verify(&self) -> Result<()> {
        for entity in &self.entities {
            let parent = entity.extends().map(|p| self.entity(p) as &dyn CharacteristicContainer);
            verify_inheritable(entity, parent)?;

            let keys = entity.attributes.iter().filter(|a| a.primary_key()).count();
            if keys > 1 {
                return Err(ModelError::invalid(
                    entity.qualified_name(),
                    format!("entity declares {} primary keys", keys),
                ));
            }
        }
        for definition in &self.structs {
            let parent = definition
                .extends()
                .map(|p| self.struct_type(p) as &dyn CharacteristicContainer);
            verify_inheritable(definition, parent)?;
        }
        for query in &self.queries {
            for parameter in query.parameters.iter() {
                parameter.verify()?;
            }
        }
        Ok(())
    }
}

fn verify_inheritable<T: InheritableCharacteristicContainer>(
    container: &T,
    parent: Option<&dyn CharacteristicContainer>,
) -> Result<()> {
    for characteristic in container.characteristics() {
        characteristic.verify()?;
        if characteristic.is_abstract() && !container.is_abstract() {
            return Err(ModelError::invalid(
                characteristic.qualified_name(),
                format!(
                    "abstract {} on concrete type {}",
                    characteristic.characteristic_kind(),
                    container.qualified_name()
                ),
            ));
        }
        let replaces_inherited =
            parent.map_or(false, |p| p.characteristic_exists(characteristic.name()));
        if characteristic.is_override() && !characteristic.inherited() && !replaces_inherited {
            return Err(ModelError::invalid(
                characteristic.qualified_name(),
                format!(
                    "{} is flagged override but does not replace an inherited {}",
                    characteristic.name(),
                    characteristic.characteristic_kind()
                ),
            ));
        }
    }
    Ok(())
}
