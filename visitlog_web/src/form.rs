//! Parsing of the registration form.
//!
//! Accepts the Portuguese field names used by the form (`nome`, `cpf`, `empresa`,
//! `destino`, `tipo_acesso`) as well as English aliases.

use std::collections::HashMap;
use visitlog_core::{EventKind, VisitEvent};

/// Decode an `application/x-www-form-urlencoded` body
pub fn parse_urlencoded(body: &str) -> HashMap<String, String> {
    let mut fields = HashMap::new();

    for pair in body.split('&') {
        if pair.is_empty() {
            continue;
        }

        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        fields.insert(decode(key), decode(value));
    }

    fields
}

fn decode(component: &str) -> String {
    let spaced = component.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

fn field<'a>(fields: &'a HashMap<String, String>, names: &[&str]) -> Option<&'a str> {
    names
        .iter()
        .filter_map(|name| fields.get(*name))
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
}

fn required<'a>(fields: &'a HashMap<String, String>, names: &[&str]) -> Result<&'a str, String> {
    field(fields, names).ok_or_else(|| format!("Missing field: {}", names[0]))
}

/// Like `required`, but an empty value is accepted as long as the key was sent
fn present<'a>(fields: &'a HashMap<String, String>, names: &[&str]) -> Result<&'a str, String> {
    names
        .iter()
        .find_map(|name| fields.get(*name))
        .map(|value| value.trim())
        .ok_or_else(|| format!("Missing field: {}", names[0]))
}

/// Build an event from submitted form fields
///
/// Company and destination are only read for entries and may be blank.
pub fn event_from_fields(fields: &HashMap<String, String>) -> Result<VisitEvent, String> {
    let kind: EventKind = required(fields, &["tipo_acesso", "event_kind"])?
        .parse()
        .map_err(|e: visitlog_core::Error| e.to_string())?;
    let name = required(fields, &["nome", "name"])?;
    let personal_id = required(fields, &["cpf", "personal_id"])?;

    match kind {
        EventKind::Entry => Ok(VisitEvent::entry(
            name,
            personal_id,
            present(fields, &["empresa", "company"])?,
            present(fields, &["destino", "destination"])?,
        )),
        EventKind::Exit => Ok(VisitEvent::exit(name, personal_id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_urlencoded() {
        let fields = parse_urlencoded("nome=Jo%C3%A3o+Silva&cpf=123.456&empty=&flag");
        assert_eq!(fields["nome"], "João Silva");
        assert_eq!(fields["cpf"], "123.456");
        assert_eq!(fields["empty"], "");
        assert_eq!(fields["flag"], "");
    }

    #[test]
    fn test_entry_event_from_fields() {
        let fields = parse_urlencoded(
            "nome=Alice&cpf=111&empresa=Acme&destino=Floor2&tipo_acesso=entrada",
        );
        let event = event_from_fields(&fields).unwrap();
        assert_eq!(event, VisitEvent::entry("Alice", "111", "Acme", "Floor2"));
    }

    #[test]
    fn test_exit_event_with_english_names() {
        let fields = parse_urlencoded("name=Alice&personal_id=111&event_kind=saida");
        let event = event_from_fields(&fields).unwrap();
        assert_eq!(event, VisitEvent::exit("Alice", "111"));
    }

    #[test]
    fn test_blank_company_and_destination_accepted() {
        let fields =
            parse_urlencoded("nome=Alice&cpf=111&empresa=&destino=&tipo_acesso=entrada");
        let event = event_from_fields(&fields).unwrap();
        assert_eq!(event, VisitEvent::entry("Alice", "111", "", ""));

        let fields = parse_urlencoded("nome=Alice&cpf=111&destino=Floor2&tipo_acesso=entrada");
        assert_eq!(event_from_fields(&fields).unwrap_err(), "Missing field: empresa");
    }

    #[test]
    fn test_missing_fields_rejected() {
        let fields = parse_urlencoded("nome=Alice&tipo_acesso=entrada");
        assert_eq!(event_from_fields(&fields).unwrap_err(), "Missing field: cpf");

        let fields = parse_urlencoded("nome=Alice&cpf=111&tipo_acesso=visita");
        assert!(event_from_fields(&fields).unwrap_err().contains("Unknown event kind"));
    }
}
