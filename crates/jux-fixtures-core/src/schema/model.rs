// crates/jux-fixtures-core/src/schema/model.rs
// ============================================================================
// Module: Schema Model
// Description: Compiled XSD components used during instance validation.
// Purpose: Hold declarations, content models, and attribute uses.
// Dependencies: jux-fixtures-core::schema::types
// ============================================================================

//! ## Overview
//! Compiled components mirror the XSD component model closely enough for
//! JUnit schemas: element declarations, complex types with element, simple,
//! or empty content, particles with occurrence bounds, and attribute sets.
//! Named complex types are referenced by name so recursive content models
//! (a suite containing suites) stay finite.

// ============================================================================
// SECTION: Imports
// ============================================================================

use super::types::SimpleType;

// ============================================================================
// SECTION: Occurrence
// ============================================================================

/// Upper occurrence bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MaxOccurs {
    /// At most this many.
    Bounded(u32),
    /// No upper bound.
    Unbounded,
}

/// Occurrence bounds of a particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Occurs {
    /// Minimum occurrences.
    pub(crate) min: u32,
    /// Maximum occurrences.
    pub(crate) max: MaxOccurs,
}

impl Occurs {
    /// Exactly once.
    pub(crate) const ONCE: Self = Self {
        min: 1,
        max: MaxOccurs::Bounded(1),
    };

    /// Returns true when another repetition is allowed after `count`.
    pub(crate) const fn allows_more(self, count: u32) -> bool {
        match self.max {
            MaxOccurs::Bounded(max) => count < max,
            MaxOccurs::Unbounded => true,
        }
    }
}

// ============================================================================
// SECTION: Types
// ============================================================================

/// Type of an element declaration.
#[derive(Debug, Clone)]
pub(crate) enum TypeRef {
    /// `xs:anyType`: any attributes and content.
    AnyType,
    /// Simple type.
    Simple(SimpleType),
    /// Anonymous complex type.
    Complex(Box<ComplexType>),
    /// Named complex type, resolved through the schema.
    Named(String),
}

/// Element declaration.
#[derive(Debug, Clone)]
pub(crate) struct ElementDecl {
    /// Local name.
    pub(crate) name: String,
    /// Declared type.
    pub(crate) type_ref: TypeRef,
    /// Fixed value constraint.
    pub(crate) fixed: Option<String>,
}

/// Element term of a particle.
#[derive(Debug, Clone)]
pub(crate) enum ElementTerm {
    /// Locally declared element.
    Local(Box<ElementDecl>),
    /// Reference to a global element declaration.
    Global(String),
}

/// Particle term.
#[derive(Debug, Clone)]
pub(crate) enum Term {
    /// Element.
    Element(ElementTerm),
    /// Ordered sequence.
    Sequence(Vec<Particle>),
    /// One alternative.
    Choice(Vec<Particle>),
    /// Each member at most once, any order.
    All(Vec<Particle>),
    /// Element wildcard.
    Any(Wildcard),
    /// Reference to a named model group.
    Group(String),
}

/// Namespace constraint of an element wildcard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Wildcard {
    /// `##any`.
    Any,
    /// `##other`: qualified names outside the target namespace.
    Other(Option<String>),
    /// Explicit namespaces; `None` stands for unqualified names.
    List(Vec<Option<String>>),
}

impl Wildcard {
    /// Returns true when an element in `namespace` matches.
    pub(crate) fn allows(&self, namespace: Option<&str>) -> bool {
        match self {
            Self::Any => true,
            Self::Other(target) => namespace.is_some() && namespace != target.as_deref(),
            Self::List(namespaces) => namespaces.iter().any(|allowed| allowed.as_deref() == namespace),
        }
    }
}

/// Term with occurrence bounds.
#[derive(Debug, Clone)]
pub(crate) struct Particle {
    /// Term.
    pub(crate) term: Term,
    /// Occurrence bounds.
    pub(crate) occurs: Occurs,
}

/// Content of a complex type.
#[derive(Debug, Clone)]
pub(crate) enum Content {
    /// No element children (text only when mixed).
    Empty,
    /// Element content described by a particle.
    Elements(Particle),
    /// Character data of a simple type.
    Simple(SimpleType),
}

/// Attribute use inside a complex type or attribute group.
#[derive(Debug, Clone)]
pub(crate) struct AttributeUse {
    /// Local name.
    pub(crate) name: String,
    /// Value type.
    pub(crate) value_type: SimpleType,
    /// `use="required"`.
    pub(crate) required: bool,
    /// `use="prohibited"`.
    pub(crate) prohibited: bool,
    /// Fixed value constraint.
    pub(crate) fixed: Option<String>,
}

/// Attribute uses, group references, and wildcard of a type.
#[derive(Debug, Clone, Default)]
pub(crate) struct AttributeSet {
    /// Direct attribute uses.
    pub(crate) uses: Vec<AttributeUse>,
    /// Referenced attribute groups.
    pub(crate) groups: Vec<String>,
    /// Whether `anyAttribute` is present.
    pub(crate) wildcard: bool,
}

impl AttributeSet {
    /// Adds uses from `other`, letting existing names win.
    pub(crate) fn inherit(&mut self, other: &Self) {
        for inherited in &other.uses {
            if !self.uses.iter().any(|existing| existing.name == inherited.name) {
                self.uses.push(inherited.clone());
            }
        }
        for group in &other.groups {
            if !self.groups.contains(group) {
                self.groups.push(group.clone());
            }
        }
    }
}

/// Complex type definition (derivations already flattened).
#[derive(Debug, Clone)]
pub(crate) struct ComplexType {
    /// Content model.
    pub(crate) content: Content,
    /// Attribute declarations.
    pub(crate) attributes: AttributeSet,
    /// Whether character data may be interleaved with elements.
    pub(crate) mixed: bool,
}
