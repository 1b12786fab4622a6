use super::{Tags, string_to_tags, tags_to_string};

#[test]
fn canonical_string_is_sorted() {
    let tags = Tags::new(["os-b", "gpu-a", "os-a"]);
    assert_eq!(tags_to_string(&tags), "gpu-a,os-a,os-b");
    assert_eq!(tags.to_string(), "gpu-a,os-a,os-b");
    assert_eq!(string_to_tags("os-b,gpu-a,os-a"), tags);
}

#[test]
fn empty_string_is_empty_set() {
    assert!(string_to_tags("").is_empty());
    assert_eq!(tags_to_string(&Tags::default()), "");
}

#[test]
fn set_operations() {
    let mut tags = Tags::new(["a", "b"]);
    tags.add("c");
    tags.add("a");
    assert_eq!(tags.len(), 3);
    assert!(tags.remove("b"));
    assert!(!tags.remove("b"));

    let ac = Tags::new(["a", "c"]);
    assert!(tags.contains_all(&ac));
    assert!(tags.contains_all(&Tags::default()));
    assert!(!tags.contains_all(&Tags::new(["a", "d"])));
    assert!(tags.contains_any(&Tags::new(["d", "c"])));
    assert!(!tags.contains_any(&Tags::new(["d"])));
    assert_eq!(tags.intersection(&Tags::new(["c", "d"])), Tags::new(["c"]));

    tags.remove_all(&Tags::new(["a", "x"]));
    assert_eq!(tags, Tags::new(["c"]));
}
