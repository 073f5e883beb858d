// crates/jux-fixtures-core/src/schema/validate.rs
// ============================================================================
// Module: Instance Validation
// Description: Validates a document tree against a compiled schema.
// Purpose: Collect every violation with its location and rule.
// Dependencies: jux-fixtures-core::{schema, xml}
// ============================================================================

//! ## Overview
//! Validation walks the instance tree top-down. Element content is matched
//! against the content model with a position-set matcher: each particle maps
//! a set of child positions to the set of positions it can end at, so choices
//! and optional particles backtrack without exponential retries. When the
//! end of the children is unreachable, the violation points at the first
//! child the best partial match could not consume.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use super::Schema;
use super::Violation;
use super::XSI_NAMESPACE;
use super::model::AttributeSet;
use super::model::AttributeUse;
use super::model::ComplexType;
use super::model::Content;
use super::model::ElementDecl;
use super::model::ElementTerm;
use super::model::Particle;
use super::model::Term;
use super::model::TypeRef;
use super::types::SimpleType;
use crate::xml::Document;
use crate::xml::Element;
use crate::xml::Node;
use crate::xml::XML_NAMESPACE;

/// Nesting limit for group references and `all` members.
const MAX_DEPTH: usize = 64;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Validates `document` and returns the violations in document order.
pub(super) fn validate_document(schema: &Schema, document: &Document) -> Vec<Violation> {
    let mut validator = Validator {
        schema,
        violations: Vec::new(),
    };
    let root = document.root();
    let path = format!("/{}", root.local_name());
    match schema.elements.get(root.local_name()) {
        Some(declaration) => validator.element(root, declaration, &path),
        None => validator.report(
            root,
            &path,
            "cvc-elt.1.a",
            format!("cannot find the declaration of element '{}'", root.local_name()),
        ),
    }
    validator.violations
}

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Tree walker collecting violations.
struct Validator<'s> {
    /// Compiled schema.
    schema: &'s Schema,
    /// Violations found so far.
    violations: Vec<Violation>,
}

impl<'s> Validator<'s> {
    /// Records a violation located at `element`.
    fn report(&mut self, element: &Element, path: &str, constraint: &str, message: String) {
        let position = element.position();
        self.violations.push(Violation {
            message,
            constraint: constraint.to_string(),
            line: position.map(|position| position.line),
            column: position.map(|position| position.column),
            path: path.to_string(),
        });
    }

    /// Validates an element against its declaration.
    fn element(&mut self, element: &Element, declaration: &'s ElementDecl, path: &str) {
        match &declaration.type_ref {
            TypeRef::AnyType => {}
            TypeRef::Simple(simple) => self.simple_element(element, simple, declaration, path),
            TypeRef::Complex(complex) => self.complex_element(element, complex, declaration, path),
            TypeRef::Named(name) => match self.schema.complex_types.get(name) {
                Some(complex) => self.complex_element(element, complex, declaration, path),
                None => self.report(element, path, "src-resolve", format!("type '{name}' is not defined")),
            },
        }
    }

    /// Validates an element whose type is simple.
    fn simple_element(&mut self, element: &Element, simple: &SimpleType, declaration: &ElementDecl, path: &str) {
        let name = element.local_name();
        if element.attributes().iter().any(|attribute| !is_schema_attribute(attribute.namespace.as_deref())) {
            self.report(
                element,
                path,
                "cvc-type.3.1.1",
                format!("element '{name}' has a simple type and cannot have attributes"),
            );
        }
        if element.child_elements().next().is_some() {
            self.report(
                element,
                path,
                "cvc-type.3.1.2",
                format!("element '{name}' has a simple type and cannot have element children"),
            );
            return;
        }
        self.simple_value(element, simple, declaration, path);
    }

    /// Checks character content against a simple type and fixed value.
    fn simple_value(&mut self, element: &Element, simple: &SimpleType, declaration: &ElementDecl, path: &str) {
        let text = element.text();
        if let Err(err) = simple.validate(&text) {
            self.report(
                element,
                path,
                err.constraint,
                format!("content of element '{}' is invalid: {}", element.local_name(), err.message),
            );
            return;
        }
        if let Some(fixed) = &declaration.fixed {
            let white_space = simple.white_space();
            if white_space.apply(&text) != white_space.apply(fixed) {
                self.report(
                    element,
                    path,
                    "cvc-elt.5.2.2.2.2",
                    format!(
                        "content of element '{}' must equal the fixed value '{fixed}'",
                        element.local_name()
                    ),
                );
            }
        }
    }

    /// Validates an element whose type is complex.
    fn complex_element(
        &mut self,
        element: &Element,
        complex: &'s ComplexType,
        declaration: &ElementDecl,
        path: &str,
    ) {
        self.attributes(element, &complex.attributes, path);
        let name = element.local_name();
        match &complex.content {
            Content::Empty => {
                let has_elements = element.child_elements().next().is_some();
                if has_elements || (!complex.mixed && has_character_data(element)) {
                    self.report(
                        element,
                        path,
                        "cvc-complex-type.2.1",
                        format!("element '{name}' must be empty because its type has empty content"),
                    );
                }
            }
            Content::Simple(simple) => {
                if element.child_elements().next().is_some() {
                    self.report(
                        element,
                        path,
                        "cvc-complex-type.2.2",
                        format!("element '{name}' has simple content and cannot have element children"),
                    );
                } else {
                    self.simple_value(element, simple, declaration, path);
                }
            }
            Content::Elements(particle) => {
                if !complex.mixed && has_character_data(element) {
                    self.report(
                        element,
                        path,
                        "cvc-complex-type.2.3",
                        format!("element '{name}' cannot have character content because its type is element-only"),
                    );
                }
                self.children(element, particle, path);
            }
        }
    }

    /// Matches element children against `particle` and validates each child.
    fn children(&mut self, element: &Element, particle: &'s Particle, path: &str) {
        let children: Vec<&Element> = element.child_elements().collect();
        let names: Vec<&str> = children.iter().map(|child| child.local_name()).collect();
        let namespaces: Vec<Option<&str>> = children.iter().map(|child| child.namespace()).collect();
        let mut matcher = Matcher {
            schema: self.schema,
            names: &names,
            namespaces: &namespaces,
            furthest: 0,
        };
        let ends = matcher.particle(particle, 0, 0);
        if !ends.contains(&names.len()) {
            match children.get(matcher.furthest) {
                Some(child) => {
                    let child_path = child_path(path, &children, matcher.furthest);
                    self.report(
                        child,
                        &child_path,
                        "cvc-complex-type.2.4",
                        format!(
                            "invalid content was found starting with element '{}' in element '{}'",
                            child.local_name(),
                            element.local_name()
                        ),
                    );
                }
                None => self.report(
                    element,
                    path,
                    "cvc-complex-type.2.4",
                    format!("content of element '{}' is not complete", element.local_name()),
                ),
            }
        }
        for (index, child) in children.iter().enumerate() {
            let declaration = find_declaration(self.schema, particle, child.local_name(), 0)
                .or_else(|| self.schema.elements.get(child.local_name()));
            if let Some(declaration) = declaration {
                self.element(child, declaration, &child_path(path, &children, index));
            }
        }
    }

    /// Validates attributes against the type's attribute uses.
    fn attributes(&mut self, element: &Element, set: &'s AttributeSet, path: &str) {
        let mut uses = Vec::new();
        let mut visited = BTreeSet::new();
        let wildcard = collect_uses(self.schema, set, &mut uses, &mut visited);
        let element_name = element.local_name();
        for attribute in element.attributes() {
            if is_schema_attribute(attribute.namespace.as_deref()) {
                continue;
            }
            let name = attribute.local_name();
            let declared =
                if attribute.namespace.is_none() { uses.iter().find(|candidate| candidate.name == name) } else { None };
            match declared {
                Some(declared) if declared.prohibited => self.report(
                    element,
                    path,
                    "cvc-complex-type.3.2.2",
                    format!("attribute '{name}' is not allowed to appear in element '{element_name}'"),
                ),
                Some(declared) => self.attribute_value(element, declared, &attribute.value, path),
                None if wildcard => {}
                None => self.report(
                    element,
                    path,
                    "cvc-complex-type.3.2.2",
                    format!("attribute '{}' is not allowed to appear in element '{element_name}'", attribute.name),
                ),
            }
        }
        for required in uses.iter().filter(|candidate| candidate.required) {
            let present = element
                .attributes()
                .iter()
                .any(|attribute| attribute.namespace.is_none() && attribute.local_name() == required.name);
            if !present {
                self.report(
                    element,
                    path,
                    "cvc-complex-type.4",
                    format!("attribute '{}' must appear on element '{element_name}'", required.name),
                );
            }
        }
    }

    /// Checks one attribute value.
    fn attribute_value(&mut self, element: &Element, declared: &AttributeUse, value: &str, path: &str) {
        if let Err(err) = declared.value_type.validate(value) {
            self.report(
                element,
                path,
                err.constraint,
                format!(
                    "value of attribute '{}' on element '{}' is invalid: {}",
                    declared.name,
                    element.local_name(),
                    err.message
                ),
            );
            return;
        }
        if let Some(fixed) = &declared.fixed {
            let white_space = declared.value_type.white_space();
            if white_space.apply(value) != white_space.apply(fixed) {
                self.report(
                    element,
                    path,
                    "cvc-attribute.4",
                    format!(
                        "value '{value}' of attribute '{}' on element '{}' must equal the fixed value '{fixed}'",
                        declared.name,
                        element.local_name()
                    ),
                );
            }
        }
    }
}

// ============================================================================
// SECTION: Content Matcher
// ============================================================================

/// Position-set matcher over the names of an element's children.
struct Matcher<'s, 'n> {
    /// Compiled schema (for group and global element lookups).
    schema: &'s Schema,
    /// Local names of the element children.
    names: &'n [&'n str],
    /// Namespaces of the element children.
    namespaces: &'n [Option<&'n str>],
    /// Furthest child position consumed by any partial match.
    furthest: usize,
}

impl Matcher<'_, '_> {
    /// Returns every position a particle can end at when started at `start`.
    fn particle(&mut self, particle: &Particle, start: usize, depth: usize) -> BTreeSet<usize> {
        if depth > MAX_DEPTH {
            return BTreeSet::new();
        }
        let occurs = particle.occurs;
        let mut frontier = BTreeSet::from([start]);
        let mut count = 0_u32;
        let limit = self.names.len() + 1;
        while count < occurs.min {
            let next = self.step(&particle.term, &frontier, depth);
            count += 1;
            if next.is_empty() {
                return next;
            }
            let settled = next == frontier;
            frontier = next;
            if settled || usize::try_from(count).unwrap_or(usize::MAX) > limit {
                break;
            }
        }
        let mut reached = frontier.clone();
        let mut seen = frontier.clone();
        while occurs.allows_more(count) && !frontier.is_empty() {
            let mut next = BTreeSet::new();
            for end in self.step(&particle.term, &frontier, depth) {
                if seen.insert(end) {
                    next.insert(end);
                }
            }
            reached.extend(next.iter().copied());
            frontier = next;
            count = count.saturating_add(1);
        }
        reached
    }

    /// Applies one repetition of `term` to every start position.
    fn step(&mut self, term: &Term, starts: &BTreeSet<usize>, depth: usize) -> BTreeSet<usize> {
        let mut ends = BTreeSet::new();
        for start in starts {
            ends.extend(self.term(term, *start, depth));
        }
        ends
    }

    /// Returns every position a single occurrence of `term` can end at.
    fn term(&mut self, term: &Term, start: usize, depth: usize) -> BTreeSet<usize> {
        match term {
            Term::Element(element) => {
                let name = match element {
                    ElementTerm::Local(declaration) => declaration.name.as_str(),
                    ElementTerm::Global(name) => name.as_str(),
                };
                if self.names.get(start) == Some(&name) {
                    self.furthest = self.furthest.max(start + 1);
                    BTreeSet::from([start + 1])
                } else {
                    BTreeSet::new()
                }
            }
            Term::Any(wildcard) => {
                if self.namespaces.get(start).is_some_and(|namespace| wildcard.allows(*namespace)) {
                    self.furthest = self.furthest.max(start + 1);
                    BTreeSet::from([start + 1])
                } else {
                    BTreeSet::new()
                }
            }
            Term::Sequence(members) => {
                let mut positions = BTreeSet::from([start]);
                for member in members {
                    let mut next = BTreeSet::new();
                    for position in &positions {
                        next.extend(self.particle(member, *position, depth + 1));
                    }
                    positions = next;
                    if positions.is_empty() {
                        break;
                    }
                }
                positions
            }
            Term::Choice(members) => {
                let mut ends = BTreeSet::new();
                for member in members {
                    ends.extend(self.particle(member, start, depth + 1));
                }
                ends
            }
            Term::All(members) => self.all(members, start, 0, depth + 1),
            Term::Group(name) => match self.schema.groups.get(name) {
                Some(group) => self.particle(group, start, depth + 1),
                None => BTreeSet::new(),
            },
        }
    }

    /// Matches members of an `all` group in any order, each at most once.
    fn all(&mut self, members: &[Particle], start: usize, used: u64, depth: usize) -> BTreeSet<usize> {
        let mut ends = BTreeSet::new();
        if depth > MAX_DEPTH {
            return ends;
        }
        let complete = members
            .iter()
            .enumerate()
            .all(|(index, member)| member.occurs.min == 0 || index >= 64 || used & (1 << index) != 0);
        if complete {
            ends.insert(start);
        }
        for (index, member) in members.iter().enumerate().take(64) {
            if used & (1 << index) != 0 {
                continue;
            }
            for end in self.term(&member.term, start, depth) {
                if end > start {
                    ends.extend(self.all(members, end, used | (1 << index), depth + 1));
                }
            }
        }
        ends
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns true for `xsi:*` and `xml:*` attributes, which are always allowed.
fn is_schema_attribute(namespace: Option<&str>) -> bool {
    matches!(namespace, Some(XSI_NAMESPACE | XML_NAMESPACE))
}

/// Returns true when an element has non-whitespace text or any CDATA.
fn has_character_data(element: &Element) -> bool {
    element.children().iter().any(|child| match child {
        Node::Text(_) => !child.is_whitespace(),
        Node::CData(text) => !text.is_empty(),
        _ => false,
    })
}

/// Builds `parent/name[n]` where `n` counts same-named siblings.
fn child_path(parent: &str, siblings: &[&Element], index: usize) -> String {
    let name = siblings[index].local_name();
    let ordinal = siblings[..= index].iter().filter(|sibling| sibling.local_name() == name).count();
    format!("{parent}/{name}[{ordinal}]")
}

/// Finds the declaration a content model uses for a child name.
fn find_declaration<'s>(
    schema: &'s Schema,
    particle: &'s Particle,
    name: &str,
    depth: usize,
) -> Option<&'s ElementDecl> {
    if depth > MAX_DEPTH {
        return None;
    }
    match &particle.term {
        Term::Element(ElementTerm::Local(declaration)) => (declaration.name == name).then_some(&**declaration),
        Term::Element(ElementTerm::Global(global)) => {
            if global == name { schema.elements.get(global) } else { None }
        }
        Term::Sequence(members) | Term::Choice(members) | Term::All(members) => {
            members.iter().find_map(|member| find_declaration(schema, member, name, depth + 1))
        }
        Term::Group(group) => {
            schema.groups.get(group).and_then(|group| find_declaration(schema, group, name, depth + 1))
        }
        Term::Any(_) => None,
    }
}

/// Flattens attribute uses of a set and its groups; returns the wildcard flag.
fn collect_uses<'s>(
    schema: &'s Schema,
    set: &'s AttributeSet,
    uses: &mut Vec<&'s AttributeUse>,
    visited: &mut BTreeSet<&'s str>,
) -> bool {
    let mut wildcard = set.wildcard;
    for attribute in &set.uses {
        if !uses.iter().any(|existing| existing.name == attribute.name) {
            uses.push(attribute);
        }
    }
    for group in &set.groups {
        if !visited.insert(group.as_str()) {
            continue;
        }
        if let Some(nested) = schema.attribute_groups.get(group) {
            wildcard |= collect_uses(schema, nested, uses, visited);
        }
    }
    wildcard
}
