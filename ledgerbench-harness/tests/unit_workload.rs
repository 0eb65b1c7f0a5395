use ledgerbench_harness::workload::{Category, QueryMix};

#[test]
fn test_category_names() {
    let names: Vec<&str> = Category::ALL.iter().map(Category::as_name).collect();
    assert_eq!(names, ["hash", "from", "to", "block"]);
    assert_eq!(Category::Block.label(), "Block Query");
}

#[test]
fn test_default_split() {
    let split = QueryMix::default().split(1_000);
    assert_eq!(
        split,
        [
            (Category::Hash, 400),
            (Category::From, 250),
            (Category::To, 250),
            (Category::Block, 100),
        ]
    );
}

#[test]
fn test_split_remainder_goes_to_block() {
    // floor(7 * 0.40) = 2, floor(7 * 0.25) = 1, floor(7 * 0.25) = 1 → block gets 3
    let split = QueryMix::default().split(7);
    assert_eq!(split[0], (Category::Hash, 2));
    assert_eq!(split[1], (Category::From, 1));
    assert_eq!(split[2], (Category::To, 1));
    assert_eq!(split[3], (Category::Block, 3));

    let total: usize = split.iter().map(|(_, n)| n).sum();
    assert_eq!(total, 7);
}

#[test]
fn test_split_zero() {
    let split = QueryMix::default().split(0);
    assert!(split.iter().all(|(_, n)| *n == 0));
}

#[test]
fn test_validate() {
    assert!(QueryMix::default().validate().is_ok());

    let all_hash = QueryMix { hash: 1.0, from: 0.0, to: 0.0 };
    assert!(all_hash.validate().is_ok());
    assert_eq!(all_hash.split(10)[0], (Category::Hash, 10));
    assert_eq!(all_hash.split(10)[3], (Category::Block, 0));

    assert!(QueryMix { hash: 0.6, from: 0.3, to: 0.3 }.validate().is_err());
    assert!(QueryMix { hash: -0.1, from: 0.3, to: 0.3 }.validate().is_err());
    assert!(QueryMix { hash: 1.5, from: 0.0, to: 0.0 }.validate().is_err());
}
