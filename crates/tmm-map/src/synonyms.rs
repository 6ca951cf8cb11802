//! Bidirectional dictionary of domain-term equivalents.
//!
//! Terms are stored under their compact normalized key. Every group is
//! expanded pairwise in both directions, so `b ∈ synonyms_of(a)` implies
//! `a ∈ synonyms_of(b)`.

use std::collections::{BTreeMap, BTreeSet};

use crate::normalize::normalize_field_name;

/// Built-in NL/EN/DE/ES vocabulary. The first term of a group is the Dutch key.
pub static BUILTIN_GROUPS: &[&[&str]] = &[
    // Common business terms
    &["klant", "customer", "client", "kunde"],
    &["naam", "name", "bezeichnung"],
    &["adres", "address", "adresse"],
    &["land", "country", "pais"],
    &["bedrag", "amount", "betrag", "montant"],
    &["datum", "date", "fecha"],
    &["nummer", "number", "numero"],
    &["code", "kode"],
    &["beschrijving", "description", "beschreibung", "descripcion"],
    &["status", "staat"],
    &["actief", "active", "aktiv"],
    &["blokkeren", "block", "blockieren"],
    &["vlag", "flag", "flagge"],
    &["controle", "control", "kontrolle"],
    &["indicatie", "indicator", "indikator"],
    // Banking
    &["bank", "banco"],
    &["rekening", "account", "konto", "cuenta"],
    &["saldo", "balance"],
    &["transactie", "transaction", "transaktion"],
    &["betaling", "payment", "zahlung", "pago"],
    &["overboekingen", "transfer", "uberweisung"],
    // Technical
    &["sleutel", "key", "schlussel", "clave"],
    &["waarde", "value", "wert", "valor"],
    &["type", "typ", "tipo"],
    &["referentie", "reference", "referenz", "referencia"],
    &["versie", "version"],
    &["configuratie", "configuration", "konfiguration"],
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynonymTable {
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl SynonymTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in bilingual vocabulary.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        for group in BUILTIN_GROUPS {
            table.add_group(group.iter().copied());
        }
        table
    }

    /// Registers every term of `terms` as a synonym of every other.
    pub fn add_group<I, S>(&mut self, terms: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys: BTreeSet<String> = terms
            .into_iter()
            .map(|term| normalize_field_name(term.as_ref()))
            .filter(|key| !key.is_empty())
            .collect();
        for key in &keys {
            let others = keys.iter().filter(|other| *other != key).cloned();
            self.entries.entry(key.clone()).or_default().extend(others);
        }
        self.entries.retain(|_, set| !set.is_empty());
    }

    /// Adds `term -> [equivalents]` groups, e.g. from central memory.
    pub fn extend_from(&mut self, groups: &BTreeMap<String, Vec<String>>) {
        for (term, equivalents) in groups {
            let group =
                std::iter::once(term.as_str()).chain(equivalents.iter().map(String::as_str));
            self.add_group(group);
        }
    }

    /// Normalized synonyms of `term`, excluding the term itself.
    pub fn synonyms_of(&self, term: &str) -> BTreeSet<String> {
        self.entries
            .get(&normalize_field_name(term))
            .cloned()
            .unwrap_or_default()
    }

    /// Checks two already-normalized keys.
    pub fn contains_pair(&self, left_key: &str, right_key: &str) -> bool {
        if left_key.is_empty() || left_key == right_key {
            return false;
        }
        self.entries
            .get(left_key)
            .is_some_and(|set| set.contains(right_key))
    }

    /// True when the two terms are distinct but listed as equivalents.
    pub fn is_synonym(&self, left: &str, right: &str) -> bool {
        self.contains_pair(&normalize_field_name(left), &normalize_field_name(right))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
