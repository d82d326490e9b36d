//! Integration tests for prompt-templates
//!
//! End-to-end scenarios across construction, editing, rendering and conversion.

use prompt_templates::{
    Bindings, ChatPromptBuilder, ChatSequence, ConversionOptions, FewShotBlock, FlatTemplate, PromptTemplate, Role,
    TemplateError, TemplateKind, VariableSet, auto_convert, bindings, convert_template, example,
};

// =============================================================================
// Chat editing
// =============================================================================

#[test]
fn test_tutor_scenario() {
    let mut chat = ChatSequence::from_messages([("system", "Ты {role}"), ("user", "Объясни {concept}")]);
    assert_eq!(chat.declared_variables(), &VariableSet::from(["role", "concept"]));

    chat.remove(0).expect("Failed to remove turn");
    assert_eq!(chat.declared_variables(), &VariableSet::from(["concept"]));
}

#[test]
fn test_flat_to_chat_then_edit() {
    let flat = FlatTemplate::new("Объясни, что такое {concept}, простыми словами.", ["concept"]);
    let mut chat = flat.to_chat();
    chat.add_system("Ты эксперт по {domain}.", Some(0)).unwrap();
    chat.add_user("Можешь привести пример кода для {concept}?", None).unwrap();
    assert_eq!(chat.declared_variables(), &VariableSet::from(["concept", "domain"]));

    let turns = chat
        .render(&bindings([("concept", "декораторы"), ("domain", "Python")]))
        .unwrap();
    assert_eq!(turns.len(), 3);
    assert_eq!(turns[0].role, Role::System);
    assert_eq!(turns[0].content, "Ты эксперт по Python.");
    assert_eq!(turns[2].content, "Можешь привести пример кода для декораторы?");

    // concept is baseline from the flat template, domain is not
    chat.remove(0).unwrap();
    chat.remove(1).unwrap();
    chat.update(0, Some("nothing here".to_string()), None).unwrap();
    assert_eq!(chat.declared_variables(), &VariableSet::from(["concept"]));
}

#[test]
fn test_failed_edits_do_not_change_state() {
    let mut chat = ChatSequence::from_messages([("user", "{a}")]);
    let before = chat.clone();
    assert!(matches!(chat.remove(1), Err(TemplateError::IndexOutOfRange { index: 1, len: 1 })));
    assert!(chat.update(3, Some("{b}".to_string()), Some(Role::System)).is_err());
    assert!(chat.insert("user", "{c}", Some(7)).is_err());
    assert_eq!(chat, before);
}

#[test]
fn test_chat_shared_behind_mutex() {
    use std::sync::{Arc, Mutex};

    let chat = Arc::new(Mutex::new(ChatSequence::from_messages([("system", "base")])));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let chat = Arc::clone(&chat);
            std::thread::spawn(move || {
                let mut guard = chat.lock().unwrap();
                guard.add_user(format!("{{v{}}}", i), None).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    let chat = chat.lock().unwrap();
    assert_eq!(chat.len(), 5);
    assert_eq!(chat.declared_variables().len(), 4);
}

// =============================================================================
// Conversion
// =============================================================================

#[test]
fn test_few_shot_to_flat_scenario() {
    let block = FewShotBlock::new(
        "P",
        "S",
        FlatTemplate::new("Q:{q} A:{a}", ["q", "a"]),
        vec![example([("q", "2+2"), ("a", "4")])],
        VariableSet::new(),
        "\n\n",
    );
    let flat = convert_template(&block.into(), TemplateKind::Flat);
    assert_eq!(flat.as_flat().unwrap().content(), "P\nQ:{q} A:{a}\nS");
}

#[test]
fn test_chat_to_few_shot_with_options() {
    let chat = ChatPromptBuilder::new()
        .add_system_message("Ты помощник по программированию на {language}")
        .add_user_message("Как работает {concept}?")
        .add_assistant_message("Через {mechanism}.")
        .build();
    let options = ConversionOptions::default()
        .with_prefix("Объясни следующие концепции Python:")
        .with_suffix("\nКонцепция: {concept}\nОбъяснение:");
    let converted = auto_convert(&chat.into(), TemplateKind::FewShot, &options);
    let block = converted.as_few_shot().unwrap();

    assert_eq!(block.prefix(), "Объясни следующие концепции Python:");
    assert_eq!(
        block.examples(),
        &[example([("input", "Как работает {concept}?"), ("output", "Через {mechanism}.")])]
    );
    assert_eq!(block.declared_variables(), &VariableSet::from(["input"]));
    // only input is declared now; the suffix still needs concept at render time
    assert!(!block.validate(&Bindings::new()));
    assert!(block.validate(&bindings([("input", "x")])));
    let err = block.render(&bindings([("input", "x")])).unwrap_err();
    assert_eq!(err.missing_variables(), Some(&["concept".to_string()][..]));
}

#[test]
fn test_round_trip_flat_chat_flat() {
    let source: PromptTemplate = FlatTemplate::new("Summarize {text}", ["text"]).into();
    let back = source.convert(TemplateKind::Chat).convert(TemplateKind::Flat);
    let flat = back.as_flat().unwrap();
    assert_eq!(flat.content(), "[USER]: Summarize {text}");
    assert_eq!(flat.declared_variables(), source.declared_variables());
}

#[test]
fn test_few_shot_chat_few_shot_keeps_pairs() {
    let block = FewShotBlock::from_examples(
        vec![
            example([("input", "2+2"), ("output", "4")]),
            example([("input", "3+3"), ("output", "6")]),
        ],
        FlatTemplate::new("Question: {input}\nAnswer: {output}", ["input", "output"]),
        "Solve:",
        "Question: {input}",
        ["input"],
    );
    let chat = block.to_chat();
    assert_eq!(chat.len(), 6);
    let again = chat.to_few_shot(&ConversionOptions::default());
    assert_eq!(&again.examples()[..2], block.examples());
    assert_eq!(again.examples()[2], example([("input", "Question: {input}")]));
}

#[test]
fn test_schema_follows_declared_variables() {
    let chat = ChatSequence::from_messages([("user", "{a} {b}")]);
    let schema = PromptTemplate::from(chat).input_schema();
    assert_eq!(schema["required"], serde_json::json!(["a", "b"]));
    assert_eq!(schema["properties"]["b"]["type"], "string");
}
