//! Contact records stored in an [`AvlTree`], keyed by name.
//!
//! Every field has a byte limit. Input over the limit is either cut at the
//! last char boundary that fits or refused, per [`OverflowPolicy`].

use std::fmt;

use crate::error::{Error, Result};
use crate::tree::{AvlTree, Iter};

/// Default name limit in bytes.
pub const NAME_MAX: usize = 49;
/// Default phone limit in bytes.
pub const PHONE_MAX: usize = 19;
/// Default email limit in bytes.
pub const EMAIL_MAX: usize = 49;

/// A bounded contact field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Phone,
    Email,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Name => "name",
            Field::Phone => "phone",
            Field::Email => "email",
        })
    }
}

/// What to do with a field that is over its limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Keep the longest prefix that fits and ends on a char boundary.
    #[default]
    Truncate,
    /// Fail with [`Error::FieldTooLong`].
    Reject,
}

/// Configuration for a [`ContactBook`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Longest name accepted, in bytes
    pub name_max: usize,
    /// Longest phone number accepted, in bytes
    pub phone_max: usize,
    /// Longest email accepted, in bytes
    pub email_max: usize,
    /// Handling of overlong fields
    pub overflow: OverflowPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name_max: NAME_MAX,
            phone_max: PHONE_MAX,
            email_max: EMAIL_MAX,
            overflow: OverflowPolicy::default(),
        }
    }
}

impl Config {
    pub fn limit(&self, field: Field) -> usize {
        match field {
            Field::Name => self.name_max,
            Field::Phone => self.phone_max,
            Field::Email => self.email_max,
        }
    }
}

/// The payload stored under a contact's name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Contact {
    pub phone: String,
    pub email: String,
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Phone: {} | Email: {}", self.phone, self.email)
    }
}

/// Longest prefix of `s` that is at most `max` bytes and ends on a char
/// boundary.
fn truncate_to_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// A name-ordered contact store.
pub struct ContactBook {
    contacts: AvlTree<Contact>,
    config: Config,
}

impl ContactBook {
    /// Create an empty book with the default limits.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            contacts: AvlTree::new(),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Applies the field limit to `value`.
    fn fit<'a>(&self, field: Field, value: &'a str) -> Result<&'a str> {
        let max = self.config.limit(field);
        if value.len() <= max {
            return Ok(value);
        }
        match self.config.overflow {
            OverflowPolicy::Reject => Err(Error::FieldTooLong {
                field,
                len: value.len(),
                max,
            }),
            OverflowPolicy::Truncate => {
                let cut = truncate_to_boundary(value, max);
                log::warn!("{field} truncated from {} to {} bytes", value.len(), cut.len());
                Ok(cut)
            }
        }
    }

    /// Adds a contact. An existing name is left as it is and reported as
    /// [`Error::AlreadyExists`].
    pub fn insert(&mut self, name: &str, phone: &str, email: &str) -> Result<()> {
        let name = self.fit(Field::Name, name)?;
        let contact = Contact {
            phone: self.fit(Field::Phone, phone)?.to_owned(),
            email: self.fit(Field::Email, email)?.to_owned(),
        };
        self.contacts.insert(name, contact)?;
        log::debug!("added contact {name:?}");
        Ok(())
    }

    /// Looks a contact up by name. Names are fitted to the limit the same way
    /// as on insert, so an overlong name finds its truncated entry.
    pub fn get(&self, name: &str) -> Option<&Contact> {
        let name = self.fit(Field::Name, name).ok()?;
        self.contacts.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Overwrites the given fields of an existing contact. `None` keeps the
    /// current value. All fields are checked before anything is written.
    pub fn update(&mut self, name: &str, phone: Option<&str>, email: Option<&str>) -> Result<()> {
        let name = self.fit(Field::Name, name)?;
        let phone = phone.map(|p| self.fit(Field::Phone, p)).transpose()?;
        let email = email.map(|e| self.fit(Field::Email, e)).transpose()?;

        let contact = self.contacts.get_mut(name).ok_or_else(|| Error::NotFound {
            key: name.to_owned(),
        })?;
        if let Some(phone) = phone {
            phone.clone_into(&mut contact.phone);
        }
        if let Some(email) = email {
            email.clone_into(&mut contact.email);
        }
        log::debug!("updated contact {name:?}");
        Ok(())
    }

    /// Removes a contact and returns it.
    pub fn remove(&mut self, name: &str) -> Result<Contact> {
        let name = self.fit(Field::Name, name)?;
        let contact = self.contacts.remove(name)?;
        log::debug!("removed contact {name:?}");
        Ok(contact)
    }

    pub fn clear(&mut self) {
        self.contacts.clear();
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn height(&self) -> usize {
        self.contacts.height()
    }

    /// Contacts in ascending name order.
    pub fn iter(&self) -> Iter<'_, Contact> {
        self.contacts.iter()
    }

    pub fn tree(&self) -> &AvlTree<Contact> {
        &self.contacts
    }

    /// One `Name: .. | Phone: .. | Email: ..` line per contact, sorted by name.
    pub fn listing(&self) -> Listing<'_> {
        Listing { book: self }
    }
}

impl Default for ContactBook {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a ContactBook {
    type Item = (&'a str, &'a Contact);
    type IntoIter = Iter<'a, Contact>;

    fn into_iter(self) -> Iter<'a, Contact> {
        self.iter()
    }
}

/// Display adapter returned by [`ContactBook::listing`].
pub struct Listing<'a> {
    book: &'a ContactBook,
}

impl fmt::Display for Listing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, contact) in self.book {
            writeln!(f, "Name: {name} | {contact}")?;
        }
        Ok(())
    }
}
