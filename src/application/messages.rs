//! User-facing messages in the languages the API answers in.

use itertools::Itertools;

use crate::domain::Language;

/// Language of user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    English,
    Italian,
}

impl Locale {
    /// Italian when the requested language is `italian` in any case, English otherwise.
    pub fn for_request(language: Option<&str>) -> Self {
        match language {
            Some(l) if l.trim().eq_ignore_ascii_case("italian") => Locale::Italian,
            _ => Locale::English,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    MissingParams,
    NotFound,
    InvalidPageNumber,
    InvalidPageSize,
    Unexpected,
    InvalidCredentials,
    NotAuthenticated,
    MissingNames(Vec<Language>),
    UnknownLanguage(String),
    Busy,
    NodeCreated,
    LoggedOut,
}

impl Message {
    pub fn render(&self, locale: Locale) -> String {
        use Locale::{English as En, Italian as It};
        match (self, locale) {
            (Message::MissingParams, En) => "Missing mandatory params".into(),
            (Message::MissingParams, It) => "Parametri obbligatori mancanti".into(),
            (Message::NotFound, En) => "Not found".into(),
            (Message::NotFound, It) => "Non trovato".into(),
            (Message::InvalidPageNumber, En) => "Invalid page number requested".into(),
            (Message::InvalidPageNumber, It) => "Numero di pagina richiesto non valido".into(),
            (Message::InvalidPageSize, En) => "Invalid page size requested".into(),
            (Message::InvalidPageSize, It) => "Dimensione della pagina richiesta non valida".into(),
            (Message::Unexpected, En) => "An unexpected error occurred".into(),
            (Message::Unexpected, It) => "Si è verificato un errore imprevisto".into(),
            (Message::InvalidCredentials, En) => "Invalid credentials".into(),
            (Message::InvalidCredentials, It) => "Credenziali non valide".into(),
            (Message::NotAuthenticated, En) => "Authentication credentials were not provided".into(),
            (Message::NotAuthenticated, It) => {
                "Credenziali di autenticazione non fornite".into()
            }
            (Message::MissingNames(missing), En) => format!(
                "Names must be provided for all languages. Missing: {}",
                missing.iter().join(", ")
            ),
            (Message::MissingNames(missing), It) => format!(
                "Occorre fornire i nomi per tutte le lingue. Mancanti: {}",
                missing.iter().join(", ")
            ),
            (Message::UnknownLanguage(tag), En) => format!("Unsupported language: {tag}"),
            (Message::UnknownLanguage(tag), It) => format!("Lingua non supportata: {tag}"),
            (Message::Busy, En) => "The tree is busy, please retry".into(),
            (Message::Busy, It) => "L'albero è occupato, riprovare".into(),
            (Message::NodeCreated, En) => "Node created successfully".into(),
            (Message::NodeCreated, It) => "Nodo creato con successo".into(),
            (Message::LoggedOut, En) => "Successfully logged out".into(),
            (Message::LoggedOut, It) => "Disconnessione effettuata con successo".into(),
        }
    }
}
