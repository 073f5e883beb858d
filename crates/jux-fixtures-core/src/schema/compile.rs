// crates/jux-fixtures-core/src/schema/compile.rs
// ============================================================================
// Module: Schema Compiler
// Description: Turns an `xs:schema` document into compiled components.
// Purpose: Resolve references and flatten derivations once, at load time.
// Dependencies: regex
// ============================================================================

//! ## Overview
//! Top-level components are indexed by name first so references can be
//! checked before anything is compiled. Named simple types and the bases of
//! derived complex types are compiled on demand and memoized; a name that is
//! reached again while it is still being compiled is a circular derivation.
//! References between complex types through element declarations stay
//! symbolic ([`TypeRef::Named`]) so recursive content models are allowed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use regex::Regex;

use super::Schema;
use super::SchemaError;
use super::XSD_NAMESPACE;
use super::model::AttributeSet;
use super::model::AttributeUse;
use super::model::ComplexType;
use super::model::Content;
use super::model::ElementDecl;
use super::model::ElementTerm;
use super::model::MaxOccurs;
use super::model::Occurs;
use super::model::Particle;
use super::model::Term;
use super::model::TypeRef;
use super::model::Wildcard;
use super::types::Builtin;
use super::types::Facets;
use super::types::SimpleType;
use super::types::WhiteSpace;
use super::types::translate_pattern;
use crate::xml::Element;
use crate::xml::split_qname;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Compiles the schema rooted at `root`.
pub(super) fn compile(root: &Element) -> Result<Schema, SchemaError> {
    if !root.is(Some(XSD_NAMESPACE), "schema") {
        return Err(SchemaError::NotASchema(root.name().to_string()));
    }
    Compiler::index(root)?.run()
}

// ============================================================================
// SECTION: Compiler
// ============================================================================

/// Component index and memo tables for one schema document.
struct Compiler<'a> {
    /// `targetNamespace` of the schema.
    target_namespace: Option<String>,
    /// Prefixes bound to the XSD namespace on the schema element.
    xsd_prefixes: Vec<Option<String>>,
    /// Global element declarations.
    elements: BTreeMap<&'a str, &'a Element>,
    /// Named complex type definitions.
    complex_types: BTreeMap<&'a str, &'a Element>,
    /// Named simple type definitions.
    simple_types: BTreeMap<&'a str, &'a Element>,
    /// Named model groups.
    groups: BTreeMap<&'a str, &'a Element>,
    /// Named attribute groups.
    attribute_groups: BTreeMap<&'a str, &'a Element>,
    /// Global attribute declarations.
    attributes: BTreeMap<&'a str, &'a Element>,
    /// Compiled named complex types.
    compiled_complex: BTreeMap<String, ComplexType>,
    /// Compiled named simple types.
    compiled_simple: BTreeMap<String, SimpleType>,
    /// Named types currently being compiled.
    in_progress: BTreeSet<String>,
}

impl<'a> Compiler<'a> {
    /// Indexes the top-level components of the schema.
    fn index(root: &'a Element) -> Result<Self, SchemaError> {
        let mut xsd_prefixes: Vec<Option<String>> = root
            .namespace_decls()
            .iter()
            .filter(|decl| decl.uri == XSD_NAMESPACE)
            .map(|decl| decl.prefix.clone())
            .collect();
        let own_prefix = root.prefix().map(str::to_string);
        if !xsd_prefixes.contains(&own_prefix) {
            xsd_prefixes.push(own_prefix);
        }
        let mut compiler = Self {
            target_namespace: root.attribute("targetNamespace").map(str::to_string),
            xsd_prefixes,
            elements: BTreeMap::new(),
            complex_types: BTreeMap::new(),
            simple_types: BTreeMap::new(),
            groups: BTreeMap::new(),
            attribute_groups: BTreeMap::new(),
            attributes: BTreeMap::new(),
            compiled_complex: BTreeMap::new(),
            compiled_simple: BTreeMap::new(),
            in_progress: BTreeSet::new(),
        };
        for child in xsd_children(root) {
            let table = match child.local_name() {
                "element" => &mut compiler.elements,
                "complexType" => &mut compiler.complex_types,
                "simpleType" => &mut compiler.simple_types,
                "group" => &mut compiler.groups,
                "attributeGroup" => &mut compiler.attribute_groups,
                "attribute" => &mut compiler.attributes,
                "notation" => continue,
                other @ ("include" | "import" | "redefine" | "override") => {
                    return Err(SchemaError::Unsupported(format!(
                        "schema composition with <{other}> is not supported"
                    )));
                }
                other => {
                    return Err(SchemaError::Unsupported(format!("top-level <{other}>")));
                }
            };
            let name = required(child, "name")?;
            if table.insert(name, child).is_some() {
                return Err(SchemaError::Invalid(format!(
                    "duplicate top-level <{}> named '{name}'",
                    child.local_name()
                )));
            }
        }
        Ok(compiler)
    }

    /// Compiles every indexed component.
    fn run(mut self) -> Result<Schema, SchemaError> {
        let simple_names: Vec<&'a str> = self.simple_types.keys().copied().collect();
        for name in simple_names {
            self.named_simple(name)?;
        }
        let complex_names: Vec<&'a str> = self.complex_types.keys().copied().collect();
        for name in complex_names {
            self.named_complex(name)?;
        }
        let mut groups = BTreeMap::new();
        for (name, definition) in self.groups.clone() {
            groups.insert(name.to_string(), self.group_definition(definition)?);
        }
        let mut attribute_groups = BTreeMap::new();
        for (name, definition) in self.attribute_groups.clone() {
            let mut set = AttributeSet::default();
            for member in xsd_children(definition) {
                self.attribute_member(&mut set, member)?;
            }
            attribute_groups.insert(name.to_string(), set);
        }
        let mut elements = BTreeMap::new();
        for (name, declaration) in self.elements.clone() {
            elements.insert(name.to_string(), self.element_decl(declaration)?);
        }
        Ok(Schema {
            target_namespace: self.target_namespace,
            elements,
            complex_types: self.compiled_complex,
            groups,
            attribute_groups,
        })
    }

    // ------------------------------------------------------------------------
    // Type references
    // ------------------------------------------------------------------------

    /// Resolves a `type` or `base` QName.
    fn type_ref(&mut self, qname: &str) -> Result<TypeRef, SchemaError> {
        let (prefix, local) = split_qname(qname);
        let in_xsd = self.xsd_prefixes.iter().any(|bound| bound.as_deref() == prefix);
        if in_xsd {
            if local == "anyType" {
                return Ok(TypeRef::AnyType);
            }
            if let Some(builtin) = Builtin::from_name(local) {
                return Ok(TypeRef::Simple(SimpleType::Builtin(builtin)));
            }
        }
        if self.complex_types.contains_key(local) {
            return Ok(TypeRef::Named(local.to_string()));
        }
        if self.simple_types.contains_key(local) {
            return Ok(TypeRef::Simple(self.named_simple(local)?));
        }
        Err(SchemaError::UnknownType(qname.to_string()))
    }

    /// Resolves a QName that must name a simple type.
    fn simple_type_ref(&mut self, qname: &str) -> Result<SimpleType, SchemaError> {
        match self.type_ref(qname)? {
            TypeRef::Simple(simple) => Ok(simple),
            _ => Err(SchemaError::Invalid(format!("'{qname}' is not a simple type"))),
        }
    }

    /// Compiles (or returns the memoized) named simple type.
    fn named_simple(&mut self, name: &str) -> Result<SimpleType, SchemaError> {
        if let Some(compiled) = self.compiled_simple.get(name) {
            return Ok(compiled.clone());
        }
        let definition = self
            .simple_types
            .get(name)
            .copied()
            .ok_or_else(|| SchemaError::UnknownType(name.to_string()))?;
        let key = format!("simpleType {name}");
        if !self.in_progress.insert(key.clone()) {
            return Err(SchemaError::Invalid(format!("simple type '{name}' is derived from itself")));
        }
        let compiled = self.simple_type(definition);
        self.in_progress.remove(&key);
        let compiled = compiled?;
        self.compiled_simple.insert(name.to_string(), compiled.clone());
        Ok(compiled)
    }

    /// Compiles (or returns the memoized) named complex type.
    fn named_complex(&mut self, name: &str) -> Result<ComplexType, SchemaError> {
        if let Some(compiled) = self.compiled_complex.get(name) {
            return Ok(compiled.clone());
        }
        let definition = self
            .complex_types
            .get(name)
            .copied()
            .ok_or_else(|| SchemaError::UnknownType(name.to_string()))?;
        let key = format!("complexType {name}");
        if !self.in_progress.insert(key.clone()) {
            return Err(SchemaError::Invalid(format!("complex type '{name}' is derived from itself")));
        }
        let compiled = self.complex_type(definition);
        self.in_progress.remove(&key);
        let compiled = compiled?;
        self.compiled_complex.insert(name.to_string(), compiled.clone());
        Ok(compiled)
    }

    // ------------------------------------------------------------------------
    // Simple types
    // ------------------------------------------------------------------------

    /// Compiles an `xs:simpleType` element.
    fn simple_type(&mut self, definition: &'a Element) -> Result<SimpleType, SchemaError> {
        let derivation = single_child(definition, &["restriction", "list", "union"])?;
        match derivation.local_name() {
            "restriction" => {
                let mut base = derivation.attribute("base").map(|base| self.simple_type_ref(base)).transpose()?;
                let mut facets = Facets::default();
                let mut patterns = Vec::new();
                for child in xsd_children(derivation) {
                    if child.local_name() == "simpleType" && base.is_none() {
                        base = Some(self.simple_type(child)?);
                    } else {
                        apply_facet(&mut facets, &mut patterns, child)?;
                    }
                }
                let base = base.ok_or_else(|| SchemaError::Invalid("restriction without a base type".to_string()))?;
                finish_patterns(&mut facets, &patterns)?;
                Ok(SimpleType::Restricted {
                    base: Box::new(base),
                    facets: Box::new(facets),
                })
            }
            "list" => {
                let item = match derivation.attribute("itemType") {
                    Some(item) => self.simple_type_ref(item)?,
                    None => {
                        let inline = single_child(derivation, &["simpleType"])?;
                        self.simple_type(inline)?
                    }
                };
                Ok(SimpleType::List(Box::new(item)))
            }
            _ => {
                let mut members = Vec::new();
                for member in derivation.attribute("memberTypes").unwrap_or_default().split_ascii_whitespace() {
                    members.push(self.simple_type_ref(member)?);
                }
                for inline in xsd_children(derivation) {
                    members.push(self.simple_type(inline)?);
                }
                if members.is_empty() {
                    return Err(SchemaError::Invalid("union without member types".to_string()));
                }
                Ok(SimpleType::Union(members))
            }
        }
    }

    // ------------------------------------------------------------------------
    // Complex types
    // ------------------------------------------------------------------------

    /// Compiles an `xs:complexType` element.
    fn complex_type(&mut self, definition: &'a Element) -> Result<ComplexType, SchemaError> {
        let mixed = is_true(definition.attribute("mixed"));
        let mut particle = None;
        let mut attributes = AttributeSet::default();
        for child in xsd_children(definition) {
            match child.local_name() {
                "simpleContent" => return self.simple_content(child),
                "complexContent" => return self.complex_content(child, mixed),
                _ => self.complex_member(&mut particle, &mut attributes, child)?,
            }
        }
        Ok(ComplexType {
            content: particle.map_or(Content::Empty, Content::Elements),
            attributes,
            mixed,
        })
    }

    /// Handles a content-model or attribute child of a complex type.
    fn complex_member(
        &mut self,
        particle: &mut Option<Particle>,
        attributes: &mut AttributeSet,
        child: &'a Element,
    ) -> Result<(), SchemaError> {
        match child.local_name() {
            "sequence" | "choice" | "all" | "group" => {
                if particle.is_some() {
                    return Err(SchemaError::Invalid("complex type has more than one content model".to_string()));
                }
                *particle = Some(self.particle(child)?);
                Ok(())
            }
            "attribute" | "attributeGroup" | "anyAttribute" => self.attribute_member(attributes, child),
            other => Err(SchemaError::Unsupported(format!("<{other}> in a complex type"))),
        }
    }

    /// Compiles `xs:simpleContent`.
    fn simple_content(&mut self, content: &'a Element) -> Result<ComplexType, SchemaError> {
        let derivation = single_child(content, &["extension", "restriction"])?;
        let base = required(derivation, "base")?;
        let (mut value_type, inherited) = match self.type_ref(base)? {
            TypeRef::Simple(simple) => (simple, AttributeSet::default()),
            TypeRef::Named(name) => {
                let base_type = self.named_complex(&name)?;
                match base_type.content {
                    Content::Simple(simple) => (simple, base_type.attributes),
                    _ => {
                        return Err(SchemaError::Invalid(format!(
                            "simpleContent base '{base}' does not have simple content"
                        )));
                    }
                }
            }
            TypeRef::AnyType | TypeRef::Complex(_) => {
                return Err(SchemaError::Invalid(format!("simpleContent base '{base}' is not a simple type")));
            }
        };
        let restriction = derivation.local_name() == "restriction";
        let mut attributes = AttributeSet::default();
        let mut facets = Facets::default();
        let mut patterns = Vec::new();
        for child in xsd_children(derivation) {
            match child.local_name() {
                "attribute" | "attributeGroup" | "anyAttribute" => self.attribute_member(&mut attributes, child)?,
                "simpleType" if restriction => value_type = self.simple_type(child)?,
                _ if restriction => apply_facet(&mut facets, &mut patterns, child)?,
                other => return Err(SchemaError::Unsupported(format!("<{other}> in a simpleContent extension"))),
            }
        }
        if restriction {
            finish_patterns(&mut facets, &patterns)?;
            value_type = SimpleType::Restricted {
                base: Box::new(value_type),
                facets: Box::new(facets),
            };
        } else {
            attributes.wildcard |= inherited.wildcard;
        }
        attributes.inherit(&inherited);
        Ok(ComplexType {
            content: Content::Simple(value_type),
            attributes,
            mixed: false,
        })
    }

    /// Compiles `xs:complexContent`.
    fn complex_content(&mut self, content: &'a Element, mixed: bool) -> Result<ComplexType, SchemaError> {
        let mixed = content.attribute("mixed").map_or(mixed, |value| is_true(Some(value)));
        let derivation = single_child(content, &["extension", "restriction"])?;
        let base = required(derivation, "base")?;
        let base_type = match self.type_ref(base)? {
            TypeRef::AnyType => None,
            TypeRef::Named(name) => Some(self.named_complex(&name)?),
            TypeRef::Simple(_) | TypeRef::Complex(_) => {
                return Err(SchemaError::Invalid(format!("complexContent base '{base}' is not a complex type")));
            }
        };
        let mut particle = None;
        let mut attributes = AttributeSet::default();
        for child in xsd_children(derivation) {
            self.complex_member(&mut particle, &mut attributes, child)?;
        }
        let extension = derivation.local_name() == "extension";
        let base_content = base_type.as_ref().map(|base_type| &base_type.content);
        let content = match (extension, base_content, particle) {
            (true, Some(Content::Simple(_)), _) => {
                return Err(SchemaError::Invalid(format!("complexContent cannot extend simple content of '{base}'")));
            }
            (true, Some(Content::Elements(inherited)), Some(own)) => Content::Elements(Particle {
                term: Term::Sequence(vec![inherited.clone(), own]),
                occurs: Occurs::ONCE,
            }),
            (true, Some(Content::Elements(inherited)), None) => Content::Elements(inherited.clone()),
            (_, _, Some(own)) => Content::Elements(own),
            (_, _, None) => Content::Empty,
        };
        let mut inherited_mixed = false;
        if let Some(base_type) = &base_type {
            if extension {
                attributes.wildcard |= base_type.attributes.wildcard;
                inherited_mixed = base_type.mixed;
            }
            attributes.inherit(&base_type.attributes);
        }
        Ok(ComplexType {
            content,
            attributes,
            mixed: mixed || inherited_mixed,
        })
    }

    // ------------------------------------------------------------------------
    // Particles
    // ------------------------------------------------------------------------

    /// Reads the `namespace` constraint of an `xs:any`.
    fn wildcard(&self, definition: &Element) -> Wildcard {
        let Some(value) = definition.attribute("namespace") else {
            return Wildcard::Any;
        };
        match value.trim() {
            "##any" => Wildcard::Any,
            "##other" => Wildcard::Other(self.target_namespace.clone()),
            list => Wildcard::List(
                list.split_whitespace()
                    .map(|token| match token {
                        "##local" => None,
                        "##targetNamespace" => self.target_namespace.clone(),
                        uri => Some(uri.to_string()),
                    })
                    .collect(),
            ),
        }
    }

    /// Compiles a particle (`element`, `any`, `group`, or a compositor).
    fn particle(&mut self, definition: &'a Element) -> Result<Particle, SchemaError> {
        let occurs = occurs(definition)?;
        let term = match definition.local_name() {
            "element" => Term::Element(self.element_term(definition)?),
            "any" => Term::Any(self.wildcard(definition)),
            "group" => {
                let reference = required(definition, "ref")?;
                let (_, local) = split_qname(reference);
                if !self.groups.contains_key(local) {
                    return Err(SchemaError::UnknownReference {
                        kind: "group",
                        name: reference.to_string(),
                    });
                }
                Term::Group(local.to_string())
            }
            compositor @ ("sequence" | "choice" | "all") => {
                let mut members = Vec::new();
                for child in xsd_children(definition) {
                    members.push(self.particle(child)?);
                }
                match compositor {
                    "sequence" => Term::Sequence(members),
                    "choice" => Term::Choice(members),
                    _ => Term::All(members),
                }
            }
            other => return Err(SchemaError::Unsupported(format!("<{other}> in a content model"))),
        };
        Ok(Particle {
            term,
            occurs,
        })
    }

    /// Compiles the body of a named model group.
    fn group_definition(&mut self, definition: &'a Element) -> Result<Particle, SchemaError> {
        let compositor = single_child(definition, &["sequence", "choice", "all"])?;
        self.particle(compositor)
    }

    /// Resolves an element particle to a local declaration or a reference.
    fn element_term(&mut self, definition: &'a Element) -> Result<ElementTerm, SchemaError> {
        if let Some(reference) = definition.attribute("ref") {
            let (_, local) = split_qname(reference);
            if !self.elements.contains_key(local) {
                return Err(SchemaError::UnknownReference {
                    kind: "element",
                    name: reference.to_string(),
                });
            }
            return Ok(ElementTerm::Global(local.to_string()));
        }
        Ok(ElementTerm::Local(Box::new(self.element_decl(definition)?)))
    }

    /// Compiles an element declaration.
    fn element_decl(&mut self, definition: &'a Element) -> Result<ElementDecl, SchemaError> {
        let name = required(definition, "name")?.to_string();
        let mut type_ref = definition.attribute("type").map(|qname| self.type_ref(qname)).transpose()?;
        for child in xsd_children(definition) {
            match child.local_name() {
                "complexType" if type_ref.is_none() => {
                    type_ref = Some(TypeRef::Complex(Box::new(self.complex_type(child)?)));
                }
                "simpleType" if type_ref.is_none() => {
                    type_ref = Some(TypeRef::Simple(self.simple_type(child)?));
                }
                other => {
                    return Err(SchemaError::Unsupported(format!("<{other}> in element '{name}'")));
                }
            }
        }
        Ok(ElementDecl {
            name,
            type_ref: type_ref.unwrap_or(TypeRef::AnyType),
            fixed: definition.attribute("fixed").map(str::to_string),
        })
    }

    // ------------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------------

    /// Adds an `attribute`, `attributeGroup`, or `anyAttribute` to `set`.
    fn attribute_member(&mut self, set: &mut AttributeSet, member: &'a Element) -> Result<(), SchemaError> {
        match member.local_name() {
            "attribute" => {
                if let Some(attribute) = self.attribute_use(member)? {
                    set.uses.push(attribute);
                }
            }
            "attributeGroup" => {
                let reference = required(member, "ref")?;
                let (_, local) = split_qname(reference);
                if !self.attribute_groups.contains_key(local) {
                    return Err(SchemaError::UnknownReference {
                        kind: "attribute group",
                        name: reference.to_string(),
                    });
                }
                set.groups.push(local.to_string());
            }
            "anyAttribute" => set.wildcard = true,
            other => return Err(SchemaError::Unsupported(format!("<{other}> among attribute declarations"))),
        }
        Ok(())
    }

    /// Compiles an attribute use; references to `xml:*` attributes yield none.
    fn attribute_use(&mut self, definition: &'a Element) -> Result<Option<AttributeUse>, SchemaError> {
        let (required_use, prohibited) = match definition.attribute("use").unwrap_or("optional") {
            "optional" => (false, false),
            "required" => (true, false),
            "prohibited" => (false, true),
            other => return Err(SchemaError::Invalid(format!("attribute use '{other}'"))),
        };
        let mut fixed = definition.attribute("fixed").map(str::to_string);
        let (name, value_type) = if let Some(reference) = definition.attribute("ref") {
            let (prefix, local) = split_qname(reference);
            if prefix == Some("xml") {
                return Ok(None);
            }
            let declaration = self.attributes.get(local).copied().ok_or_else(|| SchemaError::UnknownReference {
                kind: "attribute",
                name: reference.to_string(),
            })?;
            if fixed.is_none() {
                fixed = declaration.attribute("fixed").map(str::to_string);
            }
            (local.to_string(), self.attribute_type(declaration)?)
        } else {
            (required(definition, "name")?.to_string(), self.attribute_type(definition)?)
        };
        Ok(Some(AttributeUse {
            name,
            value_type,
            required: required_use,
            prohibited,
            fixed,
        }))
    }

    /// Resolves the type of an attribute declaration.
    fn attribute_type(&mut self, declaration: &'a Element) -> Result<SimpleType, SchemaError> {
        if let Some(qname) = declaration.attribute("type") {
            return self.simple_type_ref(qname);
        }
        match xsd_children(declaration).find(|child| child.local_name() == "simpleType") {
            Some(inline) => self.simple_type(inline),
            None => Ok(SimpleType::Builtin(Builtin::AnySimpleType)),
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Iterates schema-namespace children, skipping annotations.
fn xsd_children(element: &Element) -> impl Iterator<Item = &Element> {
    element
        .child_elements()
        .filter(|child| child.namespace() == Some(XSD_NAMESPACE) && child.local_name() != "annotation")
}

/// Returns the single schema child, which must be one of `allowed`.
fn single_child<'e>(element: &'e Element, allowed: &[&str]) -> Result<&'e Element, SchemaError> {
    let mut children = xsd_children(element);
    let first = children.next().ok_or_else(|| {
        SchemaError::Invalid(format!("<{}> requires one of <{}>", element.local_name(), allowed.join(">, <")))
    })?;
    if !allowed.contains(&first.local_name()) {
        return Err(SchemaError::Unsupported(format!("<{}> in <{}>", first.local_name(), element.local_name())));
    }
    if let Some(extra) = children.next() {
        return Err(SchemaError::Invalid(format!(
            "unexpected <{}> after <{}> in <{}>",
            extra.local_name(),
            first.local_name(),
            element.local_name()
        )));
    }
    Ok(first)
}

/// Reads a required attribute of a schema component.
fn required<'e>(element: &'e Element, name: &str) -> Result<&'e str, SchemaError> {
    element
        .attribute(name)
        .ok_or_else(|| SchemaError::Invalid(format!("<{}> requires a '{name}' attribute", element.local_name())))
}

/// Interprets an `xs:boolean` attribute value.
fn is_true(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some("true" | "1"))
}

/// Reads `minOccurs`/`maxOccurs`.
fn occurs(element: &Element) -> Result<Occurs, SchemaError> {
    let parse = |name: &str, value: &str| {
        value
            .trim()
            .parse::<u32>()
            .map_err(|_| SchemaError::Invalid(format!("{name}=\"{value}\" is not a non-negative integer")))
    };
    let min = element.attribute("minOccurs").map_or(Ok(1), |value| parse("minOccurs", value))?;
    let max = match element.attribute("maxOccurs").map(str::trim) {
        None => MaxOccurs::Bounded(1),
        Some("unbounded") => MaxOccurs::Unbounded,
        Some(value) => MaxOccurs::Bounded(parse("maxOccurs", value)?),
    };
    if let MaxOccurs::Bounded(max) = max
        && max < min
    {
        return Err(SchemaError::Invalid(format!("maxOccurs {max} is less than minOccurs {min}")));
    }
    Ok(Occurs {
        min,
        max,
    })
}

/// Records one facet of a restriction.
fn apply_facet(facets: &mut Facets, patterns: &mut Vec<String>, facet: &Element) -> Result<(), SchemaError> {
    let value = required(facet, "value")?;
    let size = |value: &str| {
        value
            .trim()
            .parse::<usize>()
            .map_err(|_| SchemaError::Invalid(format!("<{}> value '{value}' is not a size", facet.local_name())))
    };
    match facet.local_name() {
        "enumeration" => facets.enumeration.push(value.to_string()),
        "pattern" => patterns.push(value.to_string()),
        "length" => facets.length = Some(size(value)?),
        "minLength" => facets.min_length = Some(size(value)?),
        "maxLength" => facets.max_length = Some(size(value)?),
        "totalDigits" => facets.total_digits = Some(size(value)?),
        "fractionDigits" => facets.fraction_digits = Some(size(value)?),
        "minInclusive" => facets.min_inclusive = Some(value.trim().to_string()),
        "maxInclusive" => facets.max_inclusive = Some(value.trim().to_string()),
        "minExclusive" => facets.min_exclusive = Some(value.trim().to_string()),
        "maxExclusive" => facets.max_exclusive = Some(value.trim().to_string()),
        "whiteSpace" => {
            facets.white_space = Some(
                WhiteSpace::from_name(value.trim())
                    .ok_or_else(|| SchemaError::Invalid(format!("whiteSpace value '{value}'")))?,
            );
        }
        other => return Err(SchemaError::Unsupported(format!("facet <{other}>"))),
    }
    Ok(())
}

/// Compiles the `pattern` facets of one restriction step into one regex.
fn finish_patterns(facets: &mut Facets, patterns: &[String]) -> Result<(), SchemaError> {
    if patterns.is_empty() {
        return Ok(());
    }
    let source = patterns.join("|");
    let alternatives: Vec<String> =
        patterns.iter().map(|pattern| format!("(?:{})", translate_pattern(pattern))).collect();
    let regex = Regex::new(&format!("^(?:{})$", alternatives.join("|"))).map_err(|err| SchemaError::Pattern {
        pattern: source.clone(),
        message: err.to_string(),
    })?;
    facets.pattern = Some((regex, source));
    Ok(())
}
