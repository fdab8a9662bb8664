use quicknotes_core::{
    NoteService, NoteServiceError, NotesProvider, ProviderConfig, ProviderError,
};
use std::sync::Arc;

fn service() -> NoteService<Arc<NotesProvider>> {
    let provider = NotesProvider::open_in_memory(ProviderConfig::default()).unwrap();
    NoteService::for_provider(Arc::new(provider))
}

#[test]
fn add_note_returns_stored_note() {
    let service = service();
    let first = service.add_note("buy milk").unwrap();
    let second = service.add_note("").unwrap();

    assert_eq!(first.text.as_deref(), Some("buy milk"));
    assert_eq!(second.text.as_deref(), Some(""));
    assert!(second.id > first.id);
}

#[test]
fn list_notes_is_live_and_oldest_first() {
    let service = service();
    let cursor = service.list_notes().unwrap();
    assert!(cursor.notes().unwrap().is_empty());

    service.add_note("one").unwrap();
    service.add_note("two").unwrap();

    assert!(cursor.is_dirty());
    let texts = cursor
        .notes()
        .unwrap()
        .into_iter()
        .map(|note| note.text.unwrap_or_default())
        .collect::<Vec<_>>();
    assert_eq!(texts, vec!["one", "two"]);
    assert!(!cursor.is_dirty());
}

#[test]
fn edit_note_replaces_text() {
    let service = service();
    let note = service.add_note("draft").unwrap();

    let edited = service.edit_note(note.id, "final").unwrap();
    assert_eq!(edited.id, note.id);
    assert_eq!(edited.text.as_deref(), Some("final"));
    assert_eq!(service.get_note(note.id).unwrap(), Some(edited));
}

#[test]
fn edit_and_remove_missing_note_report_not_found() {
    let service = service();
    assert!(matches!(
        service.edit_note(404, "x").unwrap_err(),
        NoteServiceError::NoteNotFound(404)
    ));
    assert!(matches!(
        service.remove_note(404).unwrap_err(),
        NoteServiceError::NoteNotFound(404)
    ));
}

#[test]
fn negative_ids_report_not_found() {
    let service = service();
    service.add_note("kept").unwrap();

    assert!(matches!(
        service.edit_note(-1, "x").unwrap_err(),
        NoteServiceError::NoteNotFound(-1)
    ));
    assert!(matches!(
        service.remove_note(-1).unwrap_err(),
        NoteServiceError::NoteNotFound(-1)
    ));
    assert_eq!(service.get_note(-1).unwrap(), None);
    assert_eq!(service.list_notes().unwrap().count().unwrap(), 1);
}

#[test]
fn remove_note_deletes_only_that_note() {
    let service = service();
    let keep = service.add_note("keep").unwrap();
    let gone = service.add_note("gone").unwrap();

    service.remove_note(gone.id).unwrap();
    assert_eq!(service.get_note(gone.id).unwrap(), None);
    assert_eq!(service.get_note(keep.id).unwrap(), Some(keep));
}

#[test]
fn service_over_foreign_collection_surfaces_invalid_request() {
    let provider = Arc::new(NotesProvider::open_in_memory(ProviderConfig::default()).unwrap());
    let foreign = quicknotes_core::Locator::parse("content://elsewhere/notes").unwrap();
    let service = NoteService::new(provider, foreign);

    match service.add_note("lost").unwrap_err() {
        NoteServiceError::Provider(ProviderError::InvalidRequest(_)) => {}
        other => panic!("unexpected error: {other}"),
    }
}
