//! CRN and interpretation parsers.
//!
//! A CRN is a list of reactions separated by newlines or `;`. Reactions are irreversible `R -> P`
//! or reversible `R <=> P`, sides are `+`-separated species with optional stoichiometric
//! coefficients and may be empty. A reaction can end with rates between brackets. Comments start
//! with `#` and run until the end of the line.
//!
//! ```rust
//! # use crn_verify::parse;
//! let crn = parse::crn("\
//!     ## binding
//!     A + B <=> 2i [kf = 1, kr = 0.5]
//!     i + i -> C; C ->
//! ").unwrap();
//! assert_eq!(crn.len(), 3);
//! assert_eq!(crn.to_string(), "A + B <=> i + i [kf = 1, kr = 0.5]\ni + i -> C\nC ->");
//! ```

crate::prelude!();

#[cfg(test)]
mod test;

/// Byte range of a species name, reaction or entry in CRN text.
#[readonly::make]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// First byte.
    pub start: usize,
    /// One past the last byte.
    pub end: usize,
}
impl Span {
    /// Range `start..end`.
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Span { start, end }
    }

    /// Line number, column and content of the line where the range starts.
    ///
    /// Lines and columns count from zero, a start past the end of `text` lands after the last
    /// character of the last line.
    pub fn locate(self, text: &str) -> (usize, usize, String) {
        let mut count = self.start;
        let mut last = (0, 0, String::new());
        for (row, line) in text.lines().enumerate() {
            if line.len() >= count {
                return (row, count, line.into());
            }
            count -= line.len() + 1;
            last = (row, line.len(), line.into());
        }
        last
    }
}
impl From<(usize, usize)> for Span {
    fn from((start, end): (usize, usize)) -> Self {
        Self::new(start, end)
    }
}

/// A parsed item, usually a species name, and where it comes from.
#[derive(Debug, Clone, Copy)]
pub struct Spn<T> {
    /// Parsed item.
    pub inner: T,
    /// Position of the item in the text.
    pub span: Span,
}
impl<T> Spn<T> {
    /// Attaches a position to `inner`.
    pub fn new(inner: T, span: impl Into<Span>) -> Self {
        let span = span.into();
        Self { inner, span }
    }
}
impl<T> Deref for Spn<T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.inner
    }
}

/// A positioned error raised by a grammar action.
#[derive(Debug, Clone)]
pub struct PError {
    /// Error message.
    pub msg: String,
    /// Span where the error happened.
    pub span: Span,
}
impl PError {
    /// Constructor.
    pub fn new(msg: impl Into<String>, span: impl Into<Span>) -> Self {
        Self {
            msg: msg.into(),
            span: span.into(),
        }
    }

    /// Turns itself into a proper error.
    pub fn into_error(self, text: &str) -> Error {
        let (row, col, line) = self.span.locate(text);
        ErrorKind::ParseErr(row, col, line, self.msg).into()
    }
}

/// Result of grammar actions that can fail after a successful parse.
pub type PRes<T> = Result<T, PError>;

/// Builds a multiset from parsed terms.
fn side_of(terms: Vec<(Spn<&str>, usize)>) -> Multiset {
    terms
        .into_iter()
        .map(|(sp, count)| (Species::new(sp.inner), count))
        .collect()
}

peg::parser! {
    /// PEG parsing rules.
    pub grammar rules() for str {
        /// Inline whitespace.
        rule whitespace() = quiet! { [ ' ' | '\t' | '\r' ] }

        /// Comment, from `#` to the end of the line.
        ///
        /// ```rust
        /// # use crn_verify::parse::rules::comment;
        /// assert_eq!(comment("# some comment"), Ok(()));
        /// assert!(comment("// not a comment").is_err());
        /// ```
        pub rule comment() = quiet! { "#" [^ '\n']* }

        /// Inline whitespace or comment.
        rule _() = quiet! { ( whitespace() / comment() )* }

        /// Anything that can appear between reactions.
        rule blank() = quiet! { ( whitespace() / comment() / [ '\n' | ';' ] )* }

        /// Reaction separator.
        rule sep() = quiet! { ( _ [ ';' | '\n' ] )+ _ }

        /// Species name.
        ///
        /// ```rust
        /// # use crn_verify::parse::rules::species;
        /// assert_eq!(*species("i_29").unwrap(), "i_29");
        /// assert_eq!(*species("x'").unwrap(), "x'");
        /// assert!(species("2x").is_err());
        /// ```
        pub rule species() -> Spn<&'input str>
        = quiet! {
            s:position!()
            id:$(
                [ 'a'..='z' | 'A'..='Z' | '_' ]
                [ 'a'..='z' | 'A'..='Z' | '_' | '0'..='9' | '\'' ]*
            )
            e:position!() {
                Spn::new(id, (s, e))
            }
        }
        / expected!("species name")

        /// Stoichiometric coefficient.
        pub rule coefficient() -> usize
        = quiet! {
            n:$( ['0'..='9']+ ) {? n.parse().or(Err("stoichiometric coefficient")) }
        }
        / expected!("stoichiometric coefficient")

        rule term() -> (Spn<&'input str>, usize)
        = count:( n:coefficient() _ { n } )? sp:species() {
            (sp, count.unwrap_or(1))
        }

        /// Side of a reaction, possibly empty.
        ///
        /// ```rust
        /// # use crn_verify::{ms, parse::rules::side};
        /// assert_eq!(side("A + 2 i + i").unwrap(), ms!(A, i * 3));
        /// assert_eq!(side("3B").unwrap(), ms!(B * 3));
        /// assert_eq!(side("").unwrap(), ms!());
        /// ```
        pub rule side() -> Multiset
        = terms:( term() ** ( _ "+" _ ) ) {
            side_of(terms)
        }

        /// Reaction arrow, `true` for reversible.
        rule arrow() -> bool
        = quiet! {
            ( "<=>" / "⇌" / "<->" ) { true }
            / ( "->" / "→" ) { false }
        }
        / expected!("`->` or `<=>`")

        /// Floating-point number.
        rule float() -> f64
        = quiet! {
            n:$( ['0'..='9']+ ( "." ['0'..='9']* )? ( ['e' | 'E'] ['-' | '+']? ['0'..='9']+ )? ) {?
                n.parse().or(Err("rate constant"))
            }
        }
        / expected!("rate constant")

        /// Rates, `[k = ..]` or `[kf = .., kr = ..]`.
        rule rates() -> (Option<f64>, Option<f64>)
        = "[" _ ( "kf" / "k" ) _ "=" _ kf:float() kr:( _ "," _ "kr" _ "=" _ kr:float() { kr } )? _ "]" {
            (Some(kf), kr)
        }

        /// Reaction.
        ///
        /// ```rust
        /// # use crn_verify::{ms, parse::rules::reaction};
        /// let rxn = reaction("A + B <=> C").unwrap();
        /// assert!(rxn.reversible);
        /// assert_eq!(rxn.reactants, ms!(A, B));
        /// let rxn = reaction("l ->").unwrap();
        /// assert!(!rxn.reversible);
        /// assert!(rxn.products.is_empty());
        /// ```
        pub rule reaction() -> Reaction
        = r:side() _ rev:arrow() _ p:side() _ rates:rates()? {
            let (kf, kr) = rates.unwrap_or((None, None));
            let rxn = if rev {
                Reaction::new_reversible(r, p)
            } else {
                Reaction::new(r, p)
            };
            rxn.with_rates(kf, kr)
        }

        /// CRN, reactions separated by newlines or `;`.
        pub rule crn() -> Crn
        = blank() rxns:( reaction() ** sep() ) blank() {
            rxns.into()
        }

        /// One interpretation entry, `x -> A + B` or `x ->` for nothing.
        rule entry() -> (Spn<&'input str>, Multiset)
        = sp:species() _ ( "->" / "→" / "=>" / ":" ) _ image:side() {
            (sp, image)
        }

        /// Interpretation, one entry per line or `;`-separated.
        pub rule interpretation() -> PRes<Interpretation>
        = blank() entries:( entry() ** sep() ) blank() {
            let mut m = Interpretation::new();
            for (sp, image) in entries {
                let prev = m.insert(Species::new(sp.inner), image);
                if prev.is_some() {
                    return Err(PError::new(
                        format!("species `{}` is interpreted twice", sp.inner),
                        sp.span,
                    ));
                }
            }
            Ok(m)
        }

        /// List of species separated by commas and/or whitespace.
        pub rule species_list() -> Set<Species>
        = blank() list:( species() ** ( ( whitespace() / [ ',' | '\n' ] )+ ) ) blank() {
            list.into_iter().map(|sp| Species::new(sp.inner)).collect()
        }
    }
}

/// Turns a peg error into an error.
fn peg_error(text: &str, e: peg::error::ParseError<peg::str::LineCol>) -> Error {
    let span = Span::new(e.location.offset, e.location.offset);
    let (row, col, line) = span.locate(text);
    ErrorKind::ParseErr(row, col, line, format!("expected {}", e.expected)).into()
}

/// Parses a CRN.
///
/// # Errors
///
/// - syntax errors, with their position.
pub fn crn(text: &str) -> Res<Crn> {
    rules::crn(text).map_err(|e| peg_error(text, e))
}

/// Parses an interpretation.
///
/// # Errors
///
/// - syntax errors, with their position;
/// - species interpreted twice.
pub fn interpretation(text: &str) -> Res<Interpretation> {
    match rules::interpretation(text) {
        Ok(res) => res.map_err(|e| e.into_error(text)),
        Err(e) => Err(peg_error(text, e)),
    }
}

/// Parses a list of species such as `A, B C`.
pub fn species_list(text: &str) -> Res<Set<Species>> {
    rules::species_list(text).map_err(|e| peg_error(text, e))
}
