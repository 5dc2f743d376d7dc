//! RSA key parameters and the key-exchange XML encoding
//!
//! The encoding is a flat document:
//!
//! ```xml
//! <RSAKeyValue>
//!   <Modulus>..</Modulus><Exponent>..</Exponent>
//!   <P>..</P><Q>..</Q><DP>..</DP><DQ>..</DQ><InverseQ>..</InverseQ><D>..</D>
//! </RSAKeyValue>
//! ```
//!
//! Every value is the big-endian magnitude of the number, standard base64
//! with padding. Public keys carry only `Modulus` and `Exponent`.

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::domain::DomainError;

/// Root element name of the key-exchange XML encoding
pub const KEY_XML_ROOT: &str = "RSAKeyValue";

/// Decoded RSA key parameters
///
/// A `None` field is not present in this key half; a public key leaves
/// everything but `modulus` and `exponent` empty.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RsaParameters {
    pub modulus: Option<Vec<u8>>,
    pub exponent: Option<Vec<u8>>,
    pub p: Option<Vec<u8>>,
    pub q: Option<Vec<u8>>,
    pub dp: Option<Vec<u8>>,
    pub dq: Option<Vec<u8>>,
    pub inverse_q: Option<Vec<u8>>,
    pub d: Option<Vec<u8>>,
}

impl RsaParameters {
    /// Parse the key-exchange XML encoding
    ///
    /// Element names are compared as written, prefix included, so
    /// `<x:RSAKeyValue>` is not a key document and `<x:Modulus>` is an
    /// unrecognized child. Unrecognized child elements are ignored. An
    /// element with no text yields `None`, never an empty byte vector.
    pub fn from_xml(xml: &str) -> Result<Self, DomainError> {
        let document = roxmltree::Document::parse(xml)
            .map_err(|e| DomainError::invalid_key_format(format!("Malformed key XML: {}", e)))?;

        let root = document.root_element();
        let root_name = qualified_name(xml, root);

        if root_name != KEY_XML_ROOT {
            return Err(DomainError::invalid_key_format(format!(
                "Expected root element '{}', found '{}'",
                KEY_XML_ROOT, root_name
            )));
        }

        let mut parameters = Self::default();

        for node in root.children().filter(|n| n.is_element()) {
            let name = qualified_name(xml, node);

            let slot = match name {
                "Modulus" => &mut parameters.modulus,
                "Exponent" => &mut parameters.exponent,
                "P" => &mut parameters.p,
                "Q" => &mut parameters.q,
                "DP" => &mut parameters.dp,
                "DQ" => &mut parameters.dq,
                "InverseQ" => &mut parameters.inverse_q,
                "D" => &mut parameters.d,
                _ => continue,
            };

            let text: String = node
                .descendants()
                .filter(|n| n.is_text())
                .filter_map(|n| n.text())
                .flat_map(str::chars)
                .filter(|c| !c.is_whitespace())
                .collect();

            *slot = decode_field(name, &text)?;
        }

        Ok(parameters)
    }

    /// Write the key-exchange XML encoding
    ///
    /// With `include_private` unset only `Modulus` and `Exponent` are written.
    /// Absent fields are skipped.
    pub fn to_xml(&self, include_private: bool) -> String {
        let mut xml = format!("<{}>", KEY_XML_ROOT);

        let public = [("Modulus", &self.modulus), ("Exponent", &self.exponent)];
        let private = [
            ("P", &self.p),
            ("Q", &self.q),
            ("DP", &self.dp),
            ("DQ", &self.dq),
            ("InverseQ", &self.inverse_q),
            ("D", &self.d),
        ];

        let fields = public
            .iter()
            .chain(private.iter().filter(|_| include_private));

        for (name, value) in fields {
            if let Some(bytes) = value {
                xml.push_str(&format!("<{name}>{}</{name}>", STANDARD.encode(bytes)));
            }
        }

        xml.push_str(&format!("</{}>", KEY_XML_ROOT));
        xml
    }

    /// Whether the private exponent is present
    pub fn is_private(&self) -> bool {
        self.d.is_some()
    }

    /// The public half of these parameters
    pub fn public_only(&self) -> Self {
        Self {
            modulus: self.modulus.clone(),
            exponent: self.exponent.clone(),
            ..Self::default()
        }
    }

    /// Names and byte lengths of the fields that are present, in encoding order
    pub fn present_fields(&self) -> Vec<(&'static str, usize)> {
        [
            ("Modulus", &self.modulus),
            ("Exponent", &self.exponent),
            ("P", &self.p),
            ("Q", &self.q),
            ("DP", &self.dp),
            ("DQ", &self.dq),
            ("InverseQ", &self.inverse_q),
            ("D", &self.d),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_ref().map(|bytes| (name, bytes.len())))
        .collect()
    }
}

impl std::fmt::Debug for RsaParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaParameters")
            .field("fields", &self.present_fields())
            .finish()
    }
}

/// Element name including any namespace prefix, read from the source text
fn qualified_name<'a>(xml: &'a str, node: roxmltree::Node) -> &'a str {
    let tag = &xml[node.range().start + 1..];
    let end = tag
        .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .unwrap_or(tag.len());
    &tag[..end]
}

fn decode_field(field: &str, text: &str) -> Result<Option<Vec<u8>>, DomainError> {
    if text.is_empty() {
        return Ok(None);
    }

    STANDARD
        .decode(text)
        .map(Some)
        .map_err(|e| DomainError::decode(field, e.to_string()))
}
