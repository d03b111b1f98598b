use super::clock::Clock;
use super::orchestrator::Orchestrator;
use super::surface::{SchemaRegistrar, TextSurface, VisualSurface};
use crate::catalog::Catalog;
use crate::config::SyncConfig;
use crate::error::SurfaceError;
use std::sync::Arc;

/// Composition root for an editor session.
///
/// Owns the shared catalog and configuration, and registers block schemas
/// with the visual toolkit exactly once, however many documents are opened.
pub struct Session<R> {
    catalog: Arc<Catalog>,
    config: SyncConfig,
    registrar: R,
    schemas_registered: bool,
}

impl<R: SchemaRegistrar> Session<R> {
    pub fn new(catalog: Arc<Catalog>, config: SyncConfig, registrar: R) -> Self {
        Self {
            catalog,
            config,
            registrar,
            schemas_registered: false,
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn registrar(&self) -> &R {
        &self.registrar
    }

    pub fn schemas_registered(&self) -> bool {
        self.schemas_registered
    }

    /// Hands every block schema and the palette to the registrar, once.
    /// A failed registration is retried on the next call.
    pub fn register_schemas(&mut self) -> Result<(), SurfaceError> {
        if self.schemas_registered {
            return Ok(());
        }
        let schemas = self.catalog.schemas();
        self.registrar
            .register_schemas(&schemas, self.catalog.palette())?;
        self.schemas_registered = true;
        tracing::info!(schemas = schemas.len(), "block schemas registered");
        Ok(())
    }

    /// Opens a document with its own pair of surfaces.
    pub fn open_document<T, V, C>(
        &mut self,
        text: &str,
        text_surface: T,
        visual_surface: V,
        clock: C,
    ) -> Orchestrator<T, V, C>
    where
        T: TextSurface,
        V: VisualSurface,
        C: Clock,
    {
        if let Err(e) = self.register_schemas() {
            tracing::warn!(error = %e, "schema registration failed; blocks may not render");
        }
        let mut orchestrator = Orchestrator::new(
            Arc::clone(&self.catalog),
            self.config.clone(),
            text_surface,
            visual_surface,
            clock,
        );
        orchestrator.open(text);
        orchestrator
    }
}
