//! Shared providers and helpers for unit tests

use crate::provider::DictionaryProvider;
use serde_json::json;
use std::sync::Once;

static TRACING: Once = Once::new();

/// Install a test-writer subscriber once; honours `RUST_LOG`
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn provider(value: serde_json::Value) -> DictionaryProvider {
    DictionaryProvider::from_json_value(value).expect("fixture provider should parse")
}

/// Eleven unrelated dishes, no hierarchy
pub fn menu() -> DictionaryProvider {
    let dishes = [
        "Eggs and Bacon",
        "Eggs, Bacon and Sausage",
        "Eggs and Spam",
        "Eggs, Bacon and Spam",
        "Eggs, Bacon, Sausage and Spam",
        "Spam, Bacon, Sausage and Spam",
        "Spam, Eggs, Spam, Spam, Bacon and Spam",
        "Spam, Spam, Spam, Eggs and Spam",
        "Spam, Spam, Spam, Spam, Spam, Spam, Baked Beans, Spam, Spam, Spam and Spam",
        "Lobster Thermidor aux Crevettes",
        "Lobster Thermidor",
    ];

    let items: Vec<serde_json::Value> = dishes
        .iter()
        .enumerate()
        .map(|(index, dish)| {
            let id = index + 1;
            let mut item = json!({
                "id": id.to_string(),
                "uri": format!("urn:x-skosprovider:menu:{}", id),
                "labels": [{"type": "prefLabel", "language": "en", "label": dish}]
            });
            if id == 11 {
                item["notes"] = json!([{
                    "type": "note",
                    "language": "en",
                    "note": "Served with a Mornay sauce, garnished with truffle pate, brandy and a fried egg on top."
                }]);
            }
            item
        })
        .collect();

    provider(json!({"id": "MENU", "items": items}))
}

/// Single-rooted hierarchy of ten places plus one unattached collection
pub fn geography() -> DictionaryProvider {
    let uri = |id: i64| format!("urn:x-skosprovider:geography:{}", id);
    let label = |text: &str| json!([{"type": "prefLabel", "language": "en", "label": text}]);

    provider(json!({
        "id": "GEOGRAPHY",
        "items": [
            {"id": "1", "uri": uri(1), "labels": label("World"), "narrower": [2, 3]},
            {"id": 2, "uri": uri(2), "labels": label("Europe"), "narrower": [4, 5, 10], "broader": [1]},
            {"id": 3, "uri": uri(3), "labels": label("North-America"), "narrower": [6], "broader": [1]},
            {"id": 4, "uri": uri(4), "labels": label("Belgium"), "narrower": [7, 8, 9], "broader": [2], "related": [10]},
            {"id": 5, "uri": uri(5), "labels": label("United Kingdom"), "broader": [2]},
            {"id": 6, "uri": uri(6), "labels": label("United States of America"), "broader": [3]},
            {"id": 7, "uri": uri(7), "labels": label("Flanders"), "broader": [4]},
            {"id": 8, "uri": uri(8), "labels": label("Brussels"), "broader": [4]},
            {"id": 9, "uri": uri(9), "labels": label("Wallonie"), "broader": [4]},
            {
                "id": 10,
                "uri": uri(10),
                "labels": [{"type": "prefLabel", "language": "nl", "label": "Nederland"}],
                "related": [4]
            },
            {
                "id": "333",
                "type": "collection",
                "uri": uri(333),
                "labels": label("Places where dutch is spoken"),
                "members": ["4", "7", 8, 10]
            }
        ]
    }))
}

/// Polyhierarchy: castle sits under both fortifications and habitations
pub fn buildings() -> DictionaryProvider {
    let label = |text: &str| json!([{"type": "prefLabel", "language": "en", "label": text}]);

    provider(json!({
        "id": "BUILDINGS",
        "items": [
            {
                "id": "1",
                "labels": label("Fortifications"),
                "narrower": [2],
                "matches": {"exact": ["http://vocab.getty.edu/aat/300006888"]}
            },
            {
                "id": 2,
                "labels": label("Castle"),
                "broader": [1, 3],
                "matches": {"broad": ["http://vocab.getty.edu/aat/300006888"]}
            },
            {
                "id": 3,
                "labels": label("Habitations"),
                "narrower": [2, 4],
                "matches": {"close": ["http://vocab.getty.edu/aat/300005425"]}
            },
            {
                "id": 4,
                "labels": label("Huts"),
                "broader": [3],
                "matches": {"exact": ["http://vocab.getty.edu/aat/300004824"]}
            }
        ]
    }))
}
