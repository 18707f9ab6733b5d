//! Unit-test fixtures. Only compiled for tests, so the container skips them.

pub struct Draft {
    pub title: String,
}

#[test]
fn test_fixtures_are_not_registered() {
    let container = crate::Container::new();
    assert!(container.create::<Draft>().is_err());

    let draft = Draft {
        title: container.create().unwrap(),
    };
    assert!(!draft.title.is_empty());
}
