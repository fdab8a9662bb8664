//! Ordered locator route table.
//!
//! # Invariants
//! - The table is immutable once built.
//! - The most specific pattern wins: more literal segments beat `#`
//!   wildcards; equal specificity falls back to registration order.
//! - A locator matching no route resolves to `None`.

use crate::model::note::NoteId;
use crate::provider::locator::Locator;

/// Shape of the rows a route addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteScope {
    /// Every row of the table.
    Collection,
    /// The one row whose id is captured by the `#` segment.
    Item,
}

/// What a matched locator addresses and how it may be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTarget {
    pub name: &'static str,
    pub scope: RouteScope,
    pub content_type: &'static str,
    pub supports_insert: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PatternSegment {
    Literal(String),
    Id,
}

#[derive(Debug, Clone)]
struct Route {
    authority: String,
    pattern: Vec<PatternSegment>,
    target: RouteTarget,
}

impl Route {
    fn specificity(&self) -> usize {
        self.pattern
            .iter()
            .filter(|segment| matches!(segment, PatternSegment::Literal(_)))
            .count()
    }

    fn capture(&self, locator: &Locator) -> Option<Option<NoteId>> {
        if locator.authority() != self.authority
            || locator.segments().len() != self.pattern.len()
        {
            return None;
        }

        let mut id = None;
        for (segment, pattern) in locator.segments().iter().zip(&self.pattern) {
            match pattern {
                PatternSegment::Literal(literal) if literal == segment => {}
                PatternSegment::Literal(_) => return None,
                PatternSegment::Id => id = Some(parse_id_segment(segment)?),
            }
        }
        Some(id)
    }
}

/// Successful resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub target: &'a RouteTarget,
    pub id: Option<NoteId>,
}

/// Route table for one locator scheme.
#[derive(Debug, Clone)]
pub struct RouteTable {
    scheme: String,
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            routes: Vec::new(),
        }
    }

    /// Adds one route. `path` segments are separated by `/`; a `#` segment
    /// matches one non-negative decimal id.
    pub fn with_route(
        mut self,
        authority: impl Into<String>,
        path: &str,
        target: RouteTarget,
    ) -> Self {
        let pattern = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| match segment {
                "#" => PatternSegment::Id,
                literal => PatternSegment::Literal(literal.to_string()),
            })
            .collect();
        self.routes.push(Route {
            authority: authority.into(),
            pattern,
            target,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Resolves `locator` to the most specific matching route.
    pub fn resolve(&self, locator: &Locator) -> Option<RouteMatch<'_>> {
        if locator.scheme() != self.scheme {
            return None;
        }

        let mut best: Option<(usize, RouteMatch<'_>)> = None;
        for route in &self.routes {
            let Some(id) = route.capture(locator) else {
                continue;
            };
            let specificity = route.specificity();
            if best
                .as_ref()
                .map_or(true, |(current, _)| specificity > *current)
            {
                best = Some((
                    specificity,
                    RouteMatch {
                        target: &route.target,
                        id,
                    },
                ));
            }
        }
        best.map(|(_, matched)| matched)
    }
}

fn parse_id_segment(segment: &str) -> Option<NoteId> {
    if segment.is_empty() || !segment.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::{RouteScope, RouteTable, RouteTarget};
    use crate::provider::locator::Locator;

    fn target(name: &'static str, scope: RouteScope) -> RouteTarget {
        RouteTarget {
            name,
            scope,
            content_type: "test/type",
            supports_insert: scope == RouteScope::Collection,
        }
    }

    fn table() -> RouteTable {
        RouteTable::new("content")
            .with_route("auth", "notes", target("notes", RouteScope::Collection))
            .with_route("auth", "notes/#", target("note", RouteScope::Item))
            .with_route("auth", "notes/archived", target("archived", RouteScope::Collection))
    }

    fn resolve_name(raw: &str) -> Option<&'static str> {
        let table = table();
        let locator = Locator::parse(raw).unwrap();
        table.resolve(&locator).map(|matched| matched.target.name)
    }

    #[test]
    fn collection_and_item_routes_resolve() {
        let table = table();
        let item = Locator::parse("content://auth/notes/17").unwrap();
        let matched = table.resolve(&item).unwrap();
        assert_eq!(matched.target.name, "note");
        assert_eq!(matched.id, Some(17));

        assert_eq!(resolve_name("content://auth/notes"), Some("notes"));
    }

    #[test]
    fn literal_beats_wildcard_regardless_of_order() {
        assert_eq!(resolve_name("content://auth/notes/archived"), Some("archived"));
    }

    #[test]
    fn unknown_locators_do_not_resolve() {
        for raw in [
            "content://auth/tasks",
            "content://auth",
            "content://other/notes",
            "file://auth/notes",
            "content://auth/notes/-1",
            "content://auth/notes/12x",
            "content://auth/notes/1/2",
        ] {
            assert_eq!(resolve_name(raw), None, "{raw} should not resolve");
        }
    }
}
