use git_statistics::error::GitStatsError;
use git_statistics::stats::{AggregateOptions, AuthorKey, LanguageStats, SortKey, Statistics};
use pretty_assertions::assert_eq;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn aggregate(key: AuthorKey, include_merges: bool) -> Statistics {
    Statistics::from_chunks(
        [fixture("multiple_authors.json")],
        AggregateOptions { key, include_merges },
    )
    .unwrap()
}

#[test]
fn merges_included() {
    let stats = aggregate(AuthorKey::Name, true);
    assert_eq!(stats.len(), 2);

    let kevin = stats.get("Kevin Jalbert").unwrap();
    assert_eq!(kevin.commits, 2);
    assert_eq!(kevin.merges, 1);
    assert_eq!(kevin.additions, 153);
    assert_eq!(kevin.deletions, 5);
    assert_eq!(kevin.create, 3);
    assert_eq!(
        kevin.language("Markdown"),
        Some(&LanguageStats {
            additions: 18,
            deletions: 1,
            create: 1,
        })
    );
    assert_eq!(
        kevin.language("Ruby"),
        Some(&LanguageStats {
            additions: 135,
            deletions: 4,
            create: 2,
        })
    );

    let john = stats.get("John Smith").unwrap();
    assert_eq!(john.commits, 1);
    assert_eq!(john.additions, 64);
    assert_eq!(john.deletions, 16);
    assert_eq!(john.rename, 1);
    assert_eq!(john.language("Ruby").map(|l| l.create), Some(0));
}

#[test]
fn merges_excluded() {
    let stats = aggregate(AuthorKey::Name, false);

    let kevin = stats.get("Kevin Jalbert").unwrap();
    assert_eq!(kevin.commits, 1);
    assert_eq!(kevin.merges, 0);
    assert_eq!(kevin.additions, 73);
    assert_eq!(kevin.deletions, 0);
    assert_eq!(kevin.create, 2);
    assert_eq!(
        kevin.language("Markdown"),
        Some(&LanguageStats {
            additions: 11,
            deletions: 0,
            create: 1,
        })
    );
    assert_eq!(
        kevin.language("Ruby"),
        Some(&LanguageStats {
            additions: 62,
            deletions: 0,
            create: 1,
        })
    );

    let john = stats.get("John Smith").unwrap();
    assert_eq!(john.commits, 1);
    assert_eq!(john.merges, 0);
    assert_eq!(john.additions, 64);
    assert_eq!(john.deletions, 16);
}

#[test]
fn commits_repeated_across_chunks_count_once() {
    let chunk = fixture("multiple_authors.json");
    let stats = Statistics::from_chunks(
        [&chunk, &chunk],
        AggregateOptions {
            key: AuthorKey::Name,
            include_merges: true,
        },
    )
    .unwrap();

    let kevin = stats.get("Kevin Jalbert").unwrap();
    assert_eq!(kevin.commits, 2);
    assert_eq!(kevin.additions, 153);
    assert_eq!(stats.get("John Smith").map(|s| s.commits), Some(1));
}

#[test]
fn authors_keyed_by_email() {
    let stats = aggregate(AuthorKey::Email, true);
    assert!(stats.get("Kevin Jalbert").is_none());
    assert_eq!(stats.get("kevin.j.jalbert@gmail.com").map(|s| s.commits), Some(2));
    assert_eq!(stats.get("john.smith@example.com").map(|s| s.commits), Some(1));
}

#[test]
fn top_authors_by_deletions() {
    let stats = aggregate(AuthorKey::Name, true);
    let ranked: Vec<(&str, u64)> = stats
        .top_n(SortKey::Deletions, None)
        .unwrap()
        .into_iter()
        .map(|(author, s)| (author, s.deletions))
        .collect();
    assert_eq!(ranked, vec![("John Smith", 16), ("Kevin Jalbert", 5)]);

    let top = stats.top_n(SortKey::Additions, Some(1)).unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].0, "Kevin Jalbert");
}

#[test]
fn unknown_sort_key_is_rejected() {
    assert!(matches!(
        "wrong".parse::<SortKey>(),
        Err(GitStatsError::InvalidSortKey(_))
    ));
}

#[test]
fn no_data_has_no_ranking() {
    let stats = Statistics::from_chunks(Vec::<PathBuf>::new(), AggregateOptions::default()).unwrap();
    assert!(stats.is_empty());
    assert!(stats.top_n(SortKey::Commits, Some(5)).is_none());
}
