//! Declarative routing: which steps run for which files, and where their
//! output lands.
//!
//! A [`Route`] pairs one producer step with one [`Trigger`] and one
//! [`OutputPolicy`]. The [`RouteConfig`] holds routes (and loaders) in
//! declaration order; that order is the invocation order, and a file that
//! matches several routes runs all of them.

mod policy;
mod trigger;

pub use policy::{OutputFn, OutputPolicy};
pub use trigger::{Trigger, TriggerPredicate};

use std::path::Path;
use std::sync::Arc;

use crate::step::{Loader, Step};

/// One producer-step descriptor.
#[derive(Clone)]
pub struct Route {
    pub step: Arc<dyn Step>,
    pub trigger: Trigger,
    pub policy: OutputPolicy,
}

impl Route {
    pub fn new(step: Arc<dyn Step>, trigger: Trigger, policy: OutputPolicy) -> Self {
        Self {
            step,
            trigger,
            policy,
        }
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("step", &self.step.name())
            .field("trigger", &self.trigger)
            .field("policy", &self.policy)
            .finish()
    }
}

/// Ordered set of loaders and routes for the process lifetime.
///
/// Immutable once built; a config change requires a restart.
#[derive(Default)]
pub struct RouteConfig {
    loaders: Vec<Arc<dyn Loader>>,
    routes: Vec<Route>,
}

impl RouteConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_loader(&mut self, loader: Arc<dyn Loader>) -> &mut Self {
        self.loaders.push(loader);
        self
    }

    pub fn add_route(&mut self, route: Route) -> &mut Self {
        self.routes.push(route);
        self
    }

    pub fn loaders(&self) -> &[Arc<dyn Loader>] {
        &self.loaders
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Routes triggered by `Once`, in declaration order.
    pub fn once_routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter().filter(|route| route.trigger.is_once())
    }

    /// Routes whose trigger matches the given file, in declaration order.
    ///
    /// No first-match-wins short-circuit: every matching route runs.
    pub fn matching<'a>(
        &'a self,
        root: &'a Path,
        rel: &'a Path,
    ) -> impl Iterator<Item = &'a Route> {
        self.routes
            .iter()
            .filter(move |route| route.trigger.matches(root, rel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::{StepOutput, from_fn};
    use std::path::PathBuf;

    fn noop(name: &str) -> Arc<dyn Step> {
        from_fn(name, |_| Ok(StepOutput::Bytes(Vec::new())))
    }

    #[test]
    fn test_matching_preserves_declaration_order() {
        let mut config = RouteConfig::new();
        config.add_route(Route::new(
            noop("second-by-name"),
            Trigger::ext("md"),
            OutputPolicy::change_ext("html"),
        ));
        config.add_route(Route::new(
            noop("first-by-name"),
            Trigger::File(PathBuf::from("a.md")),
            OutputPolicy::SameFileName,
        ));

        let root = Path::new("/p");
        let matched: Vec<_> = config
            .matching(root, Path::new("a.md"))
            .map(|route| route.step.name().to_string())
            .collect();

        // Both match; declaration order, not name order.
        assert_eq!(matched, vec!["second-by-name", "first-by-name"]);
    }

    #[test]
    fn test_no_match_is_empty() {
        let mut config = RouteConfig::new();
        config.add_route(Route::new(
            noop("md"),
            Trigger::ext("md"),
            OutputPolicy::change_ext("html"),
        ));

        assert_eq!(config.matching(Path::new("/p"), Path::new("notes.txt")).count(), 0);
    }

    #[test]
    fn test_once_routes_filtered() {
        let mut config = RouteConfig::new();
        config.add_route(Route::new(
            noop("feed"),
            Trigger::Once,
            OutputPolicy::NewFileName(PathBuf::from("feed.xml")),
        ));
        config.add_route(Route::new(
            noop("md"),
            Trigger::ext("md"),
            OutputPolicy::change_ext("html"),
        ));

        let once: Vec<_> = config.once_routes().map(|r| r.step.name()).collect();
        assert_eq!(once, vec!["feed"]);
    }
}
