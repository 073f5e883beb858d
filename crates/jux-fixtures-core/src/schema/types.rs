// crates/jux-fixtures-core/src/schema/types.rs
// ============================================================================
// Module: Schema Simple Types
// Description: Builtin XSD datatypes, derived simple types, and facets.
// Purpose: Check attribute values and simple element content.
// Dependencies: regex
// ============================================================================

//! ## Overview
//! Builtin datatypes are checked lexically with small hand-written scanners.
//! Derived types carry facets that run after the base type accepts the
//! value. Whitespace handling follows the effective `whiteSpace` facet of the
//! type being checked (`preserve` for `xs:string`, `collapse` for most
//! others).

// ============================================================================
// SECTION: Imports
// ============================================================================

use regex::Regex;

// ============================================================================
// SECTION: Datatype Errors
// ============================================================================

/// A value rejected by a simple type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DatatypeError {
    /// Violated validation rule.
    pub(crate) constraint: &'static str,
    /// Human-readable reason.
    pub(crate) message: String,
}

impl DatatypeError {
    fn new(constraint: &'static str, message: String) -> Self {
        Self {
            constraint,
            message,
        }
    }

    fn lexical(value: &str, type_name: &str) -> Self {
        Self::new("cvc-datatype-valid.1.2.1", format!("'{value}' is not a valid value for '{type_name}'"))
    }
}

// ============================================================================
// SECTION: Whitespace
// ============================================================================

/// `whiteSpace` facet value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WhiteSpace {
    /// Keep the value as written.
    Preserve,
    /// Replace tab, newline, and carriage return with spaces.
    Replace,
    /// Replace, then collapse runs of spaces and trim.
    Collapse,
}

impl WhiteSpace {
    /// Parses a facet value.
    pub(crate) fn from_name(name: &str) -> Option<Self> {
        match name {
            "preserve" => Some(Self::Preserve),
            "replace" => Some(Self::Replace),
            "collapse" => Some(Self::Collapse),
            _ => None,
        }
    }

    /// Applies this normalization to `value`.
    pub(crate) fn apply(self, value: &str) -> String {
        match self {
            Self::Preserve => value.to_string(),
            Self::Replace => value.replace(['\t', '\n', '\r'], " "),
            Self::Collapse => value.split_ascii_whitespace().collect::<Vec<_>>().join(" "),
        }
    }
}

// ============================================================================
// SECTION: Builtins
// ============================================================================

/// Builtin XSD datatypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Builtin {
    AnySimpleType,
    String,
    NormalizedString,
    Token,
    Language,
    Name,
    NcName,
    NmToken,
    NmTokens,
    Id,
    IdRef,
    IdRefs,
    QName,
    AnyUri,
    Boolean,
    Decimal,
    Float,
    Double,
    Integer,
    NonNegativeInteger,
    PositiveInteger,
    NonPositiveInteger,
    NegativeInteger,
    Long,
    Int,
    Short,
    Byte,
    UnsignedLong,
    UnsignedInt,
    UnsignedShort,
    UnsignedByte,
    DateTime,
    Date,
    Time,
    Duration,
    GYear,
    GYearMonth,
    Base64Binary,
    HexBinary,
}

/// Builtin names in declaration order.
const BUILTIN_NAMES: &[(&str, Builtin)] = &[
    ("anySimpleType", Builtin::AnySimpleType),
    ("string", Builtin::String),
    ("normalizedString", Builtin::NormalizedString),
    ("token", Builtin::Token),
    ("language", Builtin::Language),
    ("Name", Builtin::Name),
    ("NCName", Builtin::NcName),
    ("NMTOKEN", Builtin::NmToken),
    ("NMTOKENS", Builtin::NmTokens),
    ("ID", Builtin::Id),
    ("IDREF", Builtin::IdRef),
    ("IDREFS", Builtin::IdRefs),
    ("QName", Builtin::QName),
    ("anyURI", Builtin::AnyUri),
    ("boolean", Builtin::Boolean),
    ("decimal", Builtin::Decimal),
    ("float", Builtin::Float),
    ("double", Builtin::Double),
    ("integer", Builtin::Integer),
    ("nonNegativeInteger", Builtin::NonNegativeInteger),
    ("positiveInteger", Builtin::PositiveInteger),
    ("nonPositiveInteger", Builtin::NonPositiveInteger),
    ("negativeInteger", Builtin::NegativeInteger),
    ("long", Builtin::Long),
    ("int", Builtin::Int),
    ("short", Builtin::Short),
    ("byte", Builtin::Byte),
    ("unsignedLong", Builtin::UnsignedLong),
    ("unsignedInt", Builtin::UnsignedInt),
    ("unsignedShort", Builtin::UnsignedShort),
    ("unsignedByte", Builtin::UnsignedByte),
    ("dateTime", Builtin::DateTime),
    ("date", Builtin::Date),
    ("time", Builtin::Time),
    ("duration", Builtin::Duration),
    ("gYear", Builtin::GYear),
    ("gYearMonth", Builtin::GYearMonth),
    ("base64Binary", Builtin::Base64Binary),
    ("hexBinary", Builtin::HexBinary),
];

impl Builtin {
    /// Resolves a builtin by its local name in the XSD namespace.
    pub(crate) fn from_name(name: &str) -> Option<Self> {
        BUILTIN_NAMES.iter().find(|(candidate, _)| *candidate == name).map(|(_, builtin)| *builtin)
    }

    /// Returns the XSD local name.
    pub(crate) fn name(self) -> &'static str {
        BUILTIN_NAMES
            .iter()
            .find(|(_, builtin)| *builtin == self)
            .map_or("anySimpleType", |(name, _)| *name)
    }

    /// Returns the builtin whitespace normalization.
    pub(crate) const fn white_space(self) -> WhiteSpace {
        match self {
            Self::AnySimpleType | Self::String => WhiteSpace::Preserve,
            Self::NormalizedString => WhiteSpace::Replace,
            _ => WhiteSpace::Collapse,
        }
    }

    /// Checks an already normalized value.
    fn check(self, value: &str) -> Result<(), DatatypeError> {
        let valid = match self {
            Self::AnySimpleType | Self::String | Self::NormalizedString | Self::Token | Self::AnyUri => true,
            Self::Language => is_language(value),
            Self::Name => is_name(value, true),
            Self::NcName | Self::Id | Self::IdRef => is_name(value, false),
            Self::NmToken => is_nmtoken(value),
            Self::NmTokens => !value.is_empty() && value.split(' ').all(is_nmtoken),
            Self::IdRefs => !value.is_empty() && value.split(' ').all(|token| is_name(token, false)),
            Self::QName => is_qname(value),
            Self::Boolean => matches!(value, "true" | "false" | "1" | "0"),
            Self::Decimal => is_decimal(value),
            Self::Float | Self::Double => is_float(value),
            Self::Integer
            | Self::NonNegativeInteger
            | Self::PositiveInteger
            | Self::NonPositiveInteger
            | Self::NegativeInteger
            | Self::Long
            | Self::Int
            | Self::Short
            | Self::Byte
            | Self::UnsignedLong
            | Self::UnsignedInt
            | Self::UnsignedShort
            | Self::UnsignedByte => self.check_integer(value),
            Self::DateTime => is_date_time(value),
            Self::Date => {
                let (body, zone) = split_timezone(value);
                is_timezone(zone) && is_date(body)
            }
            Self::Time => {
                let (body, zone) = split_timezone(value);
                is_timezone(zone) && is_time(body)
            }
            Self::Duration => is_duration(value),
            Self::GYear => {
                let (body, zone) = split_timezone(value);
                is_timezone(zone) && is_year(body)
            }
            Self::GYearMonth => {
                let (body, zone) = split_timezone(value);
                is_timezone(zone)
                    && body
                        .rsplit_once('-')
                        .is_some_and(|(year, month)| is_year(year) && is_two_digits_in(month, 1, 12))
            }
            Self::Base64Binary => is_base64(value),
            Self::HexBinary => value.len() % 2 == 0 && value.bytes().all(|byte| byte.is_ascii_hexdigit()),
        };
        if valid { Ok(()) } else { Err(DatatypeError::lexical(value, self.name())) }
    }

    /// Checks integer lexical form and the range of bounded integer types.
    fn check_integer(self, value: &str) -> bool {
        if !is_integer(value) {
            return false;
        }
        let negative = value.starts_with('-') && value[1 ..].bytes().any(|byte| byte != b'0');
        let zero = value.trim_start_matches(['+', '-']).bytes().all(|byte| byte == b'0');
        let parsed = value.strip_prefix('+').unwrap_or(value).parse::<i128>().ok();
        let within = |min: i128, max: i128| parsed.is_some_and(|number| (min ..= max).contains(&number));
        match self {
            Self::NonNegativeInteger => !negative,
            Self::PositiveInteger => !negative && !zero,
            Self::NonPositiveInteger => negative || zero,
            Self::NegativeInteger => negative,
            Self::Long => within(i128::from(i64::MIN), i128::from(i64::MAX)),
            Self::Int => within(i128::from(i32::MIN), i128::from(i32::MAX)),
            Self::Short => within(i128::from(i16::MIN), i128::from(i16::MAX)),
            Self::Byte => within(i128::from(i8::MIN), i128::from(i8::MAX)),
            Self::UnsignedLong => within(0, i128::from(u64::MAX)),
            Self::UnsignedInt => within(0, i128::from(u32::MAX)),
            Self::UnsignedShort => within(0, i128::from(u16::MAX)),
            Self::UnsignedByte => within(0, i128::from(u8::MAX)),
            _ => true,
        }
    }
}

// ============================================================================
// SECTION: Facets
// ============================================================================

/// Constraining facets of a restriction.
#[derive(Debug, Clone, Default)]
pub(crate) struct Facets {
    /// Allowed values.
    pub(crate) enumeration: Vec<String>,
    /// Anchored union of all `pattern` facets, with the source patterns.
    pub(crate) pattern: Option<(Regex, String)>,
    /// Exact length.
    pub(crate) length: Option<usize>,
    /// Minimum length.
    pub(crate) min_length: Option<usize>,
    /// Maximum length.
    pub(crate) max_length: Option<usize>,
    /// Inclusive lower bound.
    pub(crate) min_inclusive: Option<String>,
    /// Inclusive upper bound.
    pub(crate) max_inclusive: Option<String>,
    /// Exclusive lower bound.
    pub(crate) min_exclusive: Option<String>,
    /// Exclusive upper bound.
    pub(crate) max_exclusive: Option<String>,
    /// Maximum number of significant digits.
    pub(crate) total_digits: Option<usize>,
    /// Maximum number of fraction digits.
    pub(crate) fraction_digits: Option<usize>,
    /// Whitespace normalization override.
    pub(crate) white_space: Option<WhiteSpace>,
}

impl Facets {
    /// Checks a normalized value; `length` is measured by the caller.
    fn check(&self, value: &str, length: usize) -> Result<(), DatatypeError> {
        if !self.enumeration.is_empty() && !self.enumeration.iter().any(|allowed| allowed == value) {
            return Err(DatatypeError::new(
                "cvc-enumeration-valid",
                format!("value '{value}' is not one of [{}]", self.enumeration.join(", ")),
            ));
        }
        if let Some((regex, source)) = &self.pattern
            && !regex.is_match(value)
        {
            return Err(DatatypeError::new(
                "cvc-pattern-valid",
                format!("value '{value}' does not match pattern '{source}'"),
            ));
        }
        check_length("cvc-length-valid", length, self.length, |actual, bound| actual == bound, "exactly")?;
        check_length("cvc-minLength-valid", length, self.min_length, |actual, bound| actual >= bound, "at least")?;
        check_length("cvc-maxLength-valid", length, self.max_length, |actual, bound| actual <= bound, "at most")?;
        self.check_bounds(value)?;
        self.check_digits(value)
    }

    /// Checks numeric bounds.
    fn check_bounds(&self, value: &str) -> Result<(), DatatypeError> {
        let bounds: [(&'static str, &Option<String>, fn(f64, f64) -> bool); 4] = [
            ("cvc-minInclusive-valid", &self.min_inclusive, |actual, bound| actual >= bound),
            ("cvc-maxInclusive-valid", &self.max_inclusive, |actual, bound| actual <= bound),
            ("cvc-minExclusive-valid", &self.min_exclusive, |actual, bound| actual > bound),
            ("cvc-maxExclusive-valid", &self.max_exclusive, |actual, bound| actual < bound),
        ];
        for (constraint, bound, accepts) in bounds {
            let Some(bound) = bound else {
                continue;
            };
            let within = match (value.parse::<f64>(), bound.parse::<f64>()) {
                (Ok(actual), Ok(limit)) => accepts(actual, limit),
                _ => false,
            };
            if !within {
                return Err(DatatypeError::new(
                    constraint,
                    format!("value '{value}' is outside the bound '{bound}'"),
                ));
            }
        }
        Ok(())
    }

    /// Checks `totalDigits` and `fractionDigits`.
    fn check_digits(&self, value: &str) -> Result<(), DatatypeError> {
        if self.total_digits.is_none() && self.fraction_digits.is_none() {
            return Ok(());
        }
        let unsigned = value.trim_start_matches(['+', '-']);
        let (integer, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        let integer = integer.trim_start_matches('0');
        let fraction = fraction.trim_end_matches('0');
        if let Some(max) = self.fraction_digits
            && fraction.len() > max
        {
            return Err(DatatypeError::new(
                "cvc-fractionDigits-valid",
                format!("value '{value}' has more than {max} fraction digits"),
            ));
        }
        if let Some(max) = self.total_digits
            && integer.len() + fraction.len() > max
        {
            return Err(DatatypeError::new(
                "cvc-totalDigits-valid",
                format!("value '{value}' has more than {max} total digits"),
            ));
        }
        Ok(())
    }
}

/// Checks one length facet.
fn check_length(
    constraint: &'static str,
    actual: usize,
    bound: Option<usize>,
    accepts: fn(usize, usize) -> bool,
    wording: &str,
) -> Result<(), DatatypeError> {
    match bound {
        Some(bound) if !accepts(actual, bound) => Err(DatatypeError::new(
            constraint,
            format!("length {actual} must be {wording} {bound}"),
        )),
        _ => Ok(()),
    }
}

// ============================================================================
// SECTION: Simple Types
// ============================================================================

/// Compiled simple type.
#[derive(Debug, Clone)]
pub(crate) enum SimpleType {
    /// Builtin datatype.
    Builtin(Builtin),
    /// Restriction of a base type by facets.
    Restricted {
        /// Base type.
        base: Box<SimpleType>,
        /// Facets added by this step.
        facets: Box<Facets>,
    },
    /// Whitespace-separated list of items.
    List(Box<SimpleType>),
    /// First member type accepting the value wins.
    Union(Vec<SimpleType>),
}

impl SimpleType {
    /// `xs:string`.
    pub(crate) const STRING: Self = Self::Builtin(Builtin::String);

    /// Returns the effective whitespace normalization.
    pub(crate) fn white_space(&self) -> WhiteSpace {
        match self {
            Self::Builtin(builtin) => builtin.white_space(),
            Self::Restricted {
                base,
                facets,
            } => facets.white_space.unwrap_or_else(|| base.white_space()),
            Self::List(_) => WhiteSpace::Collapse,
            Self::Union(_) => WhiteSpace::Preserve,
        }
    }

    /// Normalizes and checks a raw value.
    pub(crate) fn validate(&self, raw: &str) -> Result<(), DatatypeError> {
        let value = self.white_space().apply(raw);
        self.check(&value)
    }

    /// Checks a value normalized for this type.
    fn check(&self, value: &str) -> Result<(), DatatypeError> {
        match self {
            Self::Builtin(builtin) => builtin.check(value),
            Self::Restricted {
                base,
                facets,
            } => {
                base.validate(value)?;
                facets.check(value, self.length_of(value))
            }
            Self::List(item) => {
                for token in value.split(' ').filter(|token| !token.is_empty()) {
                    item.validate(token)?;
                }
                Ok(())
            }
            Self::Union(members) => {
                if members.iter().any(|member| member.validate(value).is_ok()) {
                    Ok(())
                } else {
                    Err(DatatypeError::new(
                        "cvc-datatype-valid.1.2.3",
                        format!("'{value}' is not valid for any member of the union"),
                    ))
                }
            }
        }
    }

    /// Measures a value for the length facets.
    fn length_of(&self, value: &str) -> usize {
        match self {
            Self::Builtin(Builtin::HexBinary) => value.len() / 2,
            Self::Builtin(Builtin::Base64Binary) => {
                let symbols = value.bytes().filter(|byte| !byte.is_ascii_whitespace() && *byte != b'=').count();
                symbols * 3 / 4
            }
            Self::Builtin(_) | Self::Union(_) => value.chars().count(),
            Self::Restricted {
                base, ..
            } => base.length_of(value),
            Self::List(_) => value.split(' ').filter(|token| !token.is_empty()).count(),
        }
    }
}

// ============================================================================
// SECTION: Pattern Translation
// ============================================================================

/// Translates an XSD regular expression into an anchored `regex` pattern.
///
/// XSD patterns match the whole value and add the `\i`/`\c` name-character
/// escapes, which are expanded to explicit classes here.
pub(crate) fn translate_pattern(pattern: &str) -> String {
    const INITIAL: &str = r"_:A-Za-z\u{C0}-\u{D6}\u{D8}-\u{F6}\u{F8}-\u{2FF}\u{370}-\u{37D}\u{37F}-\u{1FFF}\u{200C}-\u{200D}\u{2070}-\u{218F}\u{2C00}-\u{2FEF}\u{3001}-\u{D7FF}\u{F900}-\u{FDCF}\u{FDF0}-\u{FFFD}";
    const NAME_EXTRA: &str = r"\-.0-9\u{B7}\u{300}-\u{36F}\u{203F}-\u{2040}";
    let mut translated = String::with_capacity(pattern.len() + 8);
    let mut in_class = false;
    let mut chars = pattern.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                let Some(escaped) = chars.next() else {
                    translated.push('\\');
                    break;
                };
                let class = match escaped {
                    'i' => Some((false, INITIAL.to_string())),
                    'I' => Some((true, INITIAL.to_string())),
                    'c' => Some((false, format!("{INITIAL}{NAME_EXTRA}"))),
                    'C' => Some((true, format!("{INITIAL}{NAME_EXTRA}"))),
                    _ => None,
                };
                match class {
                    Some((false, body)) if in_class => translated.push_str(&body),
                    Some((negated, body)) => {
                        translated.push_str(if negated { "[^" } else { "[" });
                        translated.push_str(&body);
                        translated.push(']');
                    }
                    None => {
                        translated.push('\\');
                        translated.push(escaped);
                    }
                }
            }
            '[' => {
                in_class = true;
                translated.push(ch);
            }
            ']' => {
                in_class = false;
                translated.push(ch);
            }
            _ => translated.push(ch),
        }
    }
    translated
}

// ============================================================================
// SECTION: Lexical Scanners
// ============================================================================

fn is_name_start(ch: char) -> bool {
    ch == '_' || ch == ':' || ch.is_alphabetic()
}

fn is_name_char(ch: char) -> bool {
    is_name_start(ch) || ch == '-' || ch == '.' || ch.is_ascii_digit() || ch == '\u{B7}' || ch.is_alphanumeric()
}

/// Checks `Name` (with colons) or `NCName` (without).
fn is_name(value: &str, allow_colon: bool) -> bool {
    let mut chars = value.chars();
    chars.next().is_some_and(|first| is_name_start(first) && (allow_colon || first != ':'))
        && chars.all(|ch| is_name_char(ch) && (allow_colon || ch != ':'))
}

fn is_nmtoken(value: &str) -> bool {
    !value.is_empty() && value.chars().all(is_name_char)
}

fn is_qname(value: &str) -> bool {
    match value.split_once(':') {
        Some((prefix, local)) => is_name(prefix, false) && is_name(local, false),
        None => is_name(value, false),
    }
}

fn is_language(value: &str) -> bool {
    let mut parts = value.split('-');
    parts.next().is_some_and(|primary| {
        (1 ..= 8).contains(&primary.len()) && primary.bytes().all(|byte| byte.is_ascii_alphabetic())
    }) && parts.all(|part| (1 ..= 8).contains(&part.len()) && part.bytes().all(|byte| byte.is_ascii_alphanumeric()))
}

fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|byte| byte.is_ascii_digit())
}

fn is_integer(value: &str) -> bool {
    is_digits(value.strip_prefix(['+', '-']).unwrap_or(value))
}

fn is_decimal(value: &str) -> bool {
    let unsigned = value.strip_prefix(['+', '-']).unwrap_or(value);
    match unsigned.split_once('.') {
        Some((integer, fraction)) => {
            (integer.is_empty() || is_digits(integer))
                && (fraction.is_empty() || is_digits(fraction))
                && !(integer.is_empty() && fraction.is_empty())
        }
        None => is_digits(unsigned),
    }
}

fn is_float(value: &str) -> bool {
    if matches!(value, "INF" | "+INF" | "-INF" | "NaN") {
        return true;
    }
    match value.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => is_decimal(mantissa) && is_integer(exponent),
        None => is_decimal(value),
    }
}

fn is_two_digits_in(value: &str, min: u32, max: u32) -> bool {
    value.len() == 2 && is_digits(value) && value.parse::<u32>().is_ok_and(|number| (min ..= max).contains(&number))
}

fn is_year(value: &str) -> bool {
    let digits = value.strip_prefix('-').unwrap_or(value);
    digits.len() >= 4 && is_digits(digits) && (digits.len() == 4 || !digits.starts_with('0'))
}

/// Splits an optional trailing timezone (`Z` or `±hh:mm`); empty when absent.
fn split_timezone(value: &str) -> (&str, &str) {
    if let Some(body) = value.strip_suffix('Z') {
        return (body, "Z");
    }
    if value.len() > 6 && value.is_char_boundary(value.len() - 6) {
        let (body, zone) = value.split_at(value.len() - 6);
        if zone.starts_with(['+', '-']) && zone.as_bytes()[3] == b':' {
            return (body, zone);
        }
    }
    (value, "")
}

fn is_timezone(zone: &str) -> bool {
    if zone.is_empty() || zone == "Z" {
        return true;
    }
    let hours = &zone[1 .. 3];
    let minutes = &zone[4 ..];
    is_two_digits_in(hours, 0, 14) && is_two_digits_in(minutes, 0, 59)
}

fn is_date(value: &str) -> bool {
    let Some((rest, day)) = value.rsplit_once('-') else {
        return false;
    };
    let Some((year, month)) = rest.rsplit_once('-') else {
        return false;
    };
    is_year(year) && is_two_digits_in(month, 1, 12) && is_two_digits_in(day, 1, 31)
}

fn is_time(value: &str) -> bool {
    let mut parts = value.splitn(3, ':');
    let (Some(hours), Some(minutes), Some(seconds)) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    let (whole, fraction) = seconds.split_once('.').unwrap_or((seconds, "0"));
    (is_two_digits_in(hours, 0, 23) || value.starts_with("24:00:00"))
        && is_two_digits_in(minutes, 0, 59)
        && is_two_digits_in(whole, 0, 59)
        && is_digits(fraction)
}

fn is_date_time(value: &str) -> bool {
    let (body, zone) = split_timezone(value);
    let Some((date, time)) = body.split_once('T') else {
        return false;
    };
    is_timezone(zone) && is_date(date) && is_time(time)
}

fn is_duration(value: &str) -> bool {
    let Some(body) = value.strip_prefix('-').unwrap_or(value).strip_prefix('P') else {
        return false;
    };
    let (date, time) = match body.split_once('T') {
        Some((date, time)) if !time.is_empty() => (date, Some(time)),
        Some(_) => return false,
        None => (body, None),
    };
    let designators_ok = |part: &str, allowed: &[char], fraction_last: bool| {
        let mut number = String::new();
        let mut last_index = None;
        for ch in part.chars() {
            if ch.is_ascii_digit() || (fraction_last && ch == '.') {
                number.push(ch);
                continue;
            }
            let Some(index) = allowed.iter().position(|designator| *designator == ch) else {
                return false;
            };
            let ordered = last_index.is_none_or(|last| index > last);
            let numeric = if number.contains('.') { ch == 'S' && is_decimal(&number) } else { is_digits(&number) };
            if !ordered || !numeric {
                return false;
            }
            last_index = Some(index);
            number.clear();
        }
        number.is_empty()
    };
    let has_any = !date.is_empty() || time.is_some();
    has_any && designators_ok(date, &['Y', 'M', 'D'], false)
        && time.is_none_or(|time| designators_ok(time, &['H', 'M', 'S'], true))
}

fn is_base64(value: &str) -> bool {
    let symbols: Vec<u8> = value.bytes().filter(|byte| *byte != b' ').collect();
    if symbols.len() % 4 != 0 {
        return false;
    }
    let padding = symbols.iter().rev().take_while(|byte| **byte == b'=').count();
    padding <= 2
        && symbols[.. symbols.len() - padding]
            .iter()
            .all(|byte| byte.is_ascii_alphanumeric() || *byte == b'+' || *byte == b'/')
}
