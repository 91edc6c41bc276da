//! End-to-end card loading against the in-tree scene

use cardview::fetch::FetchError;
use cardview::{
    CardSession, FactoryRegistry, FileCardProvider, NoFetch, Orientation, ResolveError, Scene,
    StaticCardProvider, Toolkit, WidgetId,
};
use std::cell::RefCell;
use std::rc::Rc;

fn show(template: &str, data: &str, width: u32) -> (Scene, WidgetId) {
    let mut scene = Scene::default();
    let mut session = CardSession::new(
        StaticCardProvider::new(template, data),
        FactoryRegistry::default(),
        Rc::new(NoFetch),
    )
    .with_width(width);
    session.show_card("/", "", &mut scene).unwrap();
    let root = scene.root().unwrap();
    (scene, root)
}

#[test]
fn test_profile_card_binds_and_lays_out() {
    let template = r#"{
        "body": [
            {"type": "TextBlock", "text": "${profile.name}", "size": "Medium", "weight": "Bolder"},
            {"type": "ColumnSet", "columns": [
                {"type": "Column", "items": [
                    {"type": "Image", "url": "${profile.avatar}", "size": "Small"}
                ]},
                {"type": "Column", "items": [
                    {"type": "TextBlock", "text": "${profile.bio}"},
                    {"type": "TextBlock", "text": "Member since 2019"}
                ]}
            ]}
        ]
    }"#;
    let data = r#"{
        "profile": {
            "name": "Ada Lovelace",
            "avatar": "https://example.com/ada.png",
            "bio": "Wrote the first published algorithm for a machine"
        }
    }"#;
    let (scene, root) = show(template, data, 400);

    let top = scene.children(root).to_vec();
    assert_eq!(top.len(), 2);
    assert_eq!(scene.label(top[0]), "Ada Lovelace");
    assert_eq!(scene.font(top[0]).size, 21.0);

    let columns = scene.children(top[1]).to_vec();
    assert_eq!(scene.orientation(top[1]), Some(Orientation::Horizontal));
    let avatar = scene.children(columns[0])[0];
    assert_eq!(scene.fixed_width(avatar), Some(50));
    assert!(scene.bitmap(avatar).is_none());

    let bio = scene.children(columns[1])[0];
    assert!(scene.label(bio).starts_with("Wrote the first"));
    assert_eq!(scene.label(scene.children(columns[1])[1]), "Member since 2019");
}

#[test]
fn test_nested_unknown_types_do_not_abort_siblings() {
    let template = r#"{"body": [
        {"type": "Carousel", "items": [{"type": "TextBlock", "text": "hidden"}]},
        {"type": "ColumnSet", "columns": [
            {"type": "Column", "items": [
                {"type": "Carousel"},
                {"type": "TextBlock", "text": "visible"}
            ]},
            {"type": "Rating"}
        ]},
        {"no_type": true},
        "not even an object"
    ]}"#;
    let (scene, root) = show(template, "{}", 300);

    let top = scene.children(root).to_vec();
    assert_eq!(top.len(), 1);
    let columns = scene.children(top[0]).to_vec();
    assert_eq!(columns.len(), 1);
    let items = scene.children(columns[0]);
    assert_eq!(items.len(), 1);
    assert_eq!(scene.label(items[0]), "visible");
}

#[test]
fn test_partial_data_applies_what_resolves() {
    let template = r#"{"body": [
        {"type": "TextBlock", "text": "${a.b}"},
        {"type": "TextBlock", "text": "${a.c}"},
        {"type": "TextBlock", "text": "${a.b.c}"},
        {"type": "TextBlock", "text": "${n}"}
    ]}"#;
    let mut scene = Scene::default();
    let mut session = CardSession::new(
        StaticCardProvider::new(template, r#"{"a": {"b": "Hello"}, "n": 5}"#),
        FactoryRegistry::default(),
        Rc::new(NoFetch),
    );
    let report = session.show_card("/", "", &mut scene).unwrap();

    assert_eq!(report.sinks, 4);
    let errors: Vec<_> = report.unresolved.iter().map(|f| (f.index, &f.error)).collect();
    assert_eq!(errors.len(), 3);
    assert!(matches!(errors[0], (1, ResolveError::PathNotFound { .. })));
    assert!(matches!(errors[1], (2, ResolveError::TypeMismatch { .. })));
    assert!(matches!(errors[2], (3, ResolveError::NotAString { .. })));

    let labels: Vec<_> = scene
        .children(scene.root().unwrap())
        .iter()
        .map(|w| scene.label(*w))
        .collect();
    assert_eq!(labels, ["Hello", "", "", ""]);
}

#[test]
fn test_resize_rewraps_both_columns_and_is_stable() {
    let template = r#"{"body": [
        {"type": "ColumnSet", "columns": [
            {"type": "Column", "items": [{"type": "TextBlock", "text": "left column words"}]},
            {"type": "Column", "items": [{"type": "TextBlock", "text": "right column words"}]}
        ]}
    ]}"#;
    let mut scene = Scene::default();
    let mut session = CardSession::new(
        StaticCardProvider::new(template, "{}"),
        FactoryRegistry::default(),
        Rc::new(NoFetch),
    )
    .with_width(2000);
    session.show_card("/", "", &mut scene).unwrap();

    let row = scene.children(scene.root().unwrap())[0];
    let columns = scene.children(row).to_vec();
    let left = scene.children(columns[0])[0];
    let right = scene.children(columns[1])[0];
    assert_eq!(scene.label(left), "left column words");

    session.on_resize(&mut scene, 70);
    let narrow = (scene.label(left), scene.label(right));
    assert!(narrow.0.contains('\n'));
    assert!(narrow.1.contains('\n'));

    session.on_resize(&mut scene, 70);
    assert_eq!((scene.label(left), scene.label(right)), narrow);

    let height_narrow = scene.content_height();
    session.on_resize(&mut scene, 2000);
    assert_eq!(scene.label(right), "right column words");
    assert!(scene.content_height() < height_narrow);
}

#[test]
fn test_images_fetch_through_injected_fetcher() {
    let requested = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&requested);
    let fetcher = move |url: &str| -> Result<Vec<u8>, FetchError> {
        log.borrow_mut().push(url.to_string());
        Err(FetchError::Disabled {
            url: url.to_string(),
        })
    };

    let mut scene = Scene::default();
    let mut session = CardSession::new(
        StaticCardProvider::new(
            r#"{"body": [{"type": "Image", "url": "${img}"}, {"type": "Image", "url": "plain.png"}]}"#,
            r#"{"img": "https://example.com/bound.png"}"#,
        ),
        FactoryRegistry::default(),
        Rc::new(fetcher),
    );
    session.show_card("/", "", &mut scene).unwrap();

    // The literal url loads during the build, the bound one at resolution.
    assert_eq!(
        *requested.borrow(),
        ["plain.png", "https://example.com/bound.png"]
    );
    let images = scene.children(scene.root().unwrap()).to_vec();
    assert!(images.iter().all(|w| scene.fixed_width(*w) == Some(250)));
}

#[test]
fn test_cards_from_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("card_template1.json"),
        r#"{"body": [{"type": "TextBlock", "text": "${greeting}"}]}"#,
    )
    .unwrap();
    std::fs::write(dir.path().join("card1.json"), r#"{"greeting": "Hi from disk"}"#).unwrap();

    let mut scene = Scene::default();
    let mut session = CardSession::new(
        FileCardProvider::new(dir.path()),
        FactoryRegistry::default(),
        Rc::new(NoFetch),
    );
    session.show_card("/", "{}", &mut scene).unwrap();
    let label = scene.children(scene.root().unwrap())[0];
    assert_eq!(scene.label(label), "Hi from disk");

    session.show_card("/", r#"{"greeting": "Hi from caller"}"#, &mut scene).unwrap();
    let label = scene.children(scene.root().unwrap())[0];
    assert_eq!(scene.label(label), "Hi from caller");

    std::fs::write(dir.path().join("card_template1.json"), "[broken").unwrap();
    assert!(session.reload(&mut scene).unwrap().is_err());
    assert_eq!(scene.label(label), "Hi from caller");
}

#[test]
fn test_bundled_card_renders_with_bundled_settings() {
    let root_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    let mut settings = cardview::config::read_settings(&root_dir.join("cardview.toml")).unwrap();
    settings.cards.dir = root_dir.join(&settings.cards.dir);

    let mut scene = Scene::default();
    let mut session = CardSession::new(
        FileCardProvider::from_settings(&settings.cards),
        FactoryRegistry::with_defaults(cardview::CardStyle::from(&settings)),
        Rc::new(NoFetch),
    )
    .with_width(settings.window.width);
    let report = session
        .show_card(&settings.cards.initial, "", &mut scene)
        .unwrap();

    assert!(report.is_complete());
    assert_eq!(report.sinks, 5);
    let top = scene.children(scene.root().unwrap()).to_vec();
    assert_eq!(top.len(), 3);
    assert_eq!(scene.label(top[0]), "Publish Adaptive Card Schema");
    assert!(scene.describe().contains("Image placeholder"));
}
