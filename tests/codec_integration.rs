use pretty_assertions::assert_eq;
use tomo_core::TomoError;
use tomo_core::document::comment::preview;
use tomo_core::document::{CommentId, CommentTable, Document, HitRegion, decode, encode};

fn table(entries: &[(&str, &str)]) -> CommentTable {
    CommentTable::from_entries(entries.iter().filter_map(|(key, text)| {
        CommentId::parse(key).map(|id| (id, text.to_string()))
    }))
}

#[test]
fn encode_then_decode_restores_body_and_comments() {
    let body = "Reunión [Comentario1] con Atacama.\nSegunda línea [Comentario2]";
    let comments = table(&[("comment_1", "primero"), ("comment_2", "segundo")]);

    let raw = encode(body, &comments);
    let doc = decode(&raw);

    assert_eq!(doc.body, body);
    assert_eq!(doc.comments, comments);
    assert_eq!(doc.comments.counter(), 2);
}

#[test]
fn encoded_layout_is_body_then_block() {
    let comments = table(&[("comment_1", "uno")]);
    let raw = encode("texto [Comentario1]  \n\n", &comments);

    assert_eq!(
        raw,
        "texto [Comentario1]\n[[comentarios]]\ncomment_1=uno\n[[/comentarios]]"
    );
}

#[test]
fn no_comments_means_no_block() {
    let raw = encode("solo texto\n", &CommentTable::new());
    assert_eq!(raw, "solo texto");
    assert!(!raw.contains("[[comentarios]]"));
}

#[test]
fn counter_is_derived_from_highest_key() {
    let raw = "a\n[[comentarios]]\ncomment_3=x\ncomment_7=y\n[[/comentarios]]";
    let mut doc = decode(raw);

    assert_eq!(doc.comments.counter(), 7);

    let id = doc.comments.insert_new("z");
    assert_eq!(id, Some(CommentId::Numbered(8)));
}

#[test]
fn malformed_lines_are_skipped() {
    let raw = "texto\n[[comentarios]]\nbasura sin igual\ncomment_2=ok\n=vacío\n[[/comentarios]]";
    let doc = decode(raw);

    assert_eq!(doc.body, "texto");
    assert_eq!(doc.comments.len(), 1);
    assert_eq!(doc.comments.get(&CommentId::Numbered(2)), Some("ok"));
}

#[test]
fn text_without_block_decodes_as_plain_body() {
    let doc = decode("  sólo cuerpo \n");

    assert_eq!(doc.body, "sólo cuerpo");
    assert!(doc.comments.is_empty());
    assert_eq!(doc.comments.counter(), 0);
}

#[test]
fn every_comment_block_is_read_and_removed() {
    let raw = "uno\n[[comentarios]]\ncomment_1=a\n[[/comentarios]]\ndos\n[[comentarios]]\ncomment_2=b\n[[/comentarios]]";
    let doc = decode(raw);

    assert_eq!(doc.body, "uno\n\ndos");
    assert_eq!(doc.comments.len(), 2);
    assert_eq!(doc.comments.counter(), 2);
}

#[test]
fn multiline_comment_text_survives() {
    let comments = table(&[("comment_1", "línea 1\nlínea 2 con \\ barra")]);
    let raw = encode("x [Comentario1]", &comments);

    assert!(raw.contains("comment_1=línea 1\\nlínea 2 con \\\\ barra\n"));
    assert_eq!(decode(&raw).comments, comments);
}

#[test]
fn non_canonical_keys_are_kept_verbatim() {
    let raw = "ver [Comentario01]\n[[comentarios]]\ncomment_01=x\nnota=y\n[[/comentarios]]";
    let doc = decode(raw);

    let named = CommentId::Named("comment_01".into());
    assert_eq!(doc.comments.get(&named), Some("x"));
    assert_eq!(named.marker(), "[Comentario01]");
    assert_eq!(doc.hit_regions().len(), 1);

    let again = doc.encode();
    assert!(again.contains("comment_01=x\n"));
    assert!(again.contains("nota=y\n"));
}

#[test]
fn hit_regions_use_character_offsets() {
    let doc = decode("Ñandú [Comentario1] y [Comentario1]\n[[comentarios]]\ncomment_1=c\n[[/comentarios]]");

    assert_eq!(
        doc.hit_regions(),
        vec![
            HitRegion {
                id: CommentId::Numbered(1),
                start: 6,
                end: 19,
            },
            HitRegion {
                id: CommentId::Numbered(1),
                start: 22,
                end: 35,
            },
        ]
    );
}

#[test]
fn marker_without_comment_is_plain_text() {
    let doc = decode("huérfano [Comentario9]");

    assert_eq!(doc.body, "huérfano [Comentario9]");
    assert!(doc.hit_regions().is_empty());
}

#[test]
fn insert_comment_splices_marker_at_char_cursor() {
    let mut doc = Document::new("añb");

    let id = doc.insert_comment(2, "nota");
    assert_eq!(id, Some(CommentId::Numbered(1)));
    assert_eq!(doc.body, "añ[Comentario1]b");

    assert_eq!(doc.insert_comment(0, ""), None);
    assert_eq!(doc.comments.counter(), 1);
}

#[test]
fn ids_are_not_reused_after_delete() -> Result<(), TomoError> {
    let mut doc = Document::new("texto");
    let first = doc.insert_comment(5, "a").unwrap();

    doc.delete_comment(&first)?;
    let second = doc.insert_comment(5, "b").unwrap();

    assert_eq!(second, CommentId::Numbered(2));
    Ok(())
}

#[test]
fn delete_comment_removes_every_marker() -> Result<(), TomoError> {
    let mut doc = decode(
        "a [Comentario1] b [Comentario1] c\n[[comentarios]]\ncomment_1=x\n[[/comentarios]]",
    );

    let removed = doc.delete_comment(&CommentId::Numbered(1))?;

    assert_eq!(removed, 2);
    assert_eq!(doc.body, "a  b  c");
    assert!(doc.comments.is_empty());
    assert_eq!(doc.encode(), "a  b  c");
    Ok(())
}

#[test]
fn deleting_unknown_comment_fails_without_changes() {
    let mut doc = Document::new("a [Comentario4]");

    let err = doc.delete_comment(&CommentId::Numbered(4));

    assert!(matches!(err, Err(TomoError::CommentNotFound(_))));
    assert_eq!(doc.body, "a [Comentario4]");
}

#[test]
fn edit_keeps_id_and_marker() -> Result<(), TomoError> {
    let mut doc = Document::new("x");
    let id = doc.insert_comment(1, "antes").unwrap();

    doc.edit_comment(&id, "después")?;

    assert_eq!(doc.comments.get(&id), Some("después"));
    assert_eq!(doc.body, "x[Comentario1]");
    Ok(())
}

#[test]
fn comment_search_is_case_insensitive() {
    let comments = table(&[
        ("comment_1", "Revisar PRESUPUESTO"),
        ("comment_2", "llamar a Ñuble"),
        ("comment_3", "presupuesto anual"),
    ]);

    let hits: Vec<String> = comments
        .search("presupuesto")
        .into_iter()
        .map(|(id, _)| id.to_string())
        .collect();
    assert_eq!(hits, vec!["comment_1", "comment_3"]);

    assert_eq!(comments.search("ñuble").len(), 1);
    assert_eq!(comments.search("  ").len(), 3);
}

#[test]
fn preview_cuts_long_text() {
    let long = "a".repeat(60);
    assert_eq!(preview(&long), format!("{}...", "a".repeat(50)));
    assert_eq!(preview("corto"), "corto");
}

#[test]
fn comment_spelling_the_closing_tag_stays_inside_block() {
    let body = "cuerpo [Comentario1] [Comentario2]";
    let comments = table(&[
        ("comment_1", "ver [[/comentarios]] luego"),
        ("comment_2", "dos"),
    ]);

    let raw = encode(body, &comments);
    assert_eq!(raw.matches("[[/comentarios]]").count(), 1);

    let doc = decode(&raw);
    assert_eq!(doc.body, body);
    assert_eq!(doc.comments, comments);
    assert_eq!(doc.hit_regions().len(), 2);
}

#[test]
fn comment_spelling_the_opening_tag_round_trips() {
    let comments = table(&[("comment_1", "[[comentarios]]\n[x]")]);
    let raw = encode("a [Comentario1]", &comments);

    assert_eq!(decode(&raw).comments, comments);
}

#[test]
fn boundary_whitespace_of_comments_survives() {
    let comments = table(&[
        ("comment_1", "  nota "),
        ("comment_2", "\ttabulada\t"),
        ("comment_3", "   "),
        ("comment_4", "\u{a0}fina\u{a0}"),
    ]);

    let raw = encode("x", &comments);
    assert!(raw.contains("comment_1=\\s\\snota\\s\n"));

    assert_eq!(decode(&raw).comments, comments);
}

#[test]
fn unknown_escapes_are_kept_literally() {
    let raw = "x\n[[comentarios]]\ncomment_1=ruta C:\\datos \\u{zz} \\q\n[[/comentarios]]";
    let doc = decode(raw);

    assert_eq!(
        doc.comments.get(&CommentId::Numbered(1)),
        Some("ruta C:\\datos \\u{zz} \\q")
    );
}

#[test]
fn exhausted_counter_refuses_new_comments() {
    let mut doc = decode("a\n[[comentarios]]\ncomment_4294967295=ultimo\n[[/comentarios]]");
    assert_eq!(doc.comments.counter(), u32::MAX);

    assert_eq!(doc.insert_comment(0, "otro"), None);
    assert_eq!(doc.body, "a");
    assert_eq!(doc.comments.len(), 1);
    assert_eq!(doc.comments.counter(), u32::MAX);
}
