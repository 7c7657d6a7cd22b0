//! Ingestion of real files through concurrent units.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::Path;

use fazebook::social::error::Error;
use fazebook::social::ingest::{IngestOptions, Source, UnitState};
use fazebook::social::network::SocialNetwork;
use tempfile::{tempdir, TempDir};

fn set(names: &[&str]) -> HashSet<String> {
    names.iter().map(ToString::to_string).collect()
}

fn write_source(dir: &Path, name: &str, contents: &str) -> Source {
    let path = dir.join(name);
    fs::write(&path, contents).expect("Failed to write source file");
    Source::from(path)
}

fn write_sources(files: &[(&str, &str)]) -> (TempDir, Vec<Source>) {
    let dir = tempdir().expect("Failed to create temp dir");
    let sources = files
        .iter()
        .map(|(name, contents)| write_source(dir.path(), name, contents))
        .collect();
    (dir, sources)
}

type FriendMap = HashMap<String, HashSet<String>>;

/// `count` distinct friendships between `person1..=personN`, never a person with
/// themselves, plus the resulting friend map.
fn friendships(users: usize, count: usize) -> (Vec<(String, String)>, FriendMap) {
    let mut seen = BTreeSet::new();
    let mut pairs = Vec::new();
    let mut expected = FriendMap::new();

    let mut step = 0;
    while pairs.len() < count {
        let a = step % users + 1;
        let b = (step * 7 + 11 + step / users * 13) % users + 1;
        step += 1;

        if a == b || !seen.insert((a.min(b), a.max(b))) {
            continue;
        }

        let (a, b) = (format!("person{a}"), format!("person{b}"));
        expected.entry(a.clone()).or_default().insert(b.clone());
        expected.entry(b.clone()).or_default().insert(a.clone());
        pairs.push((a, b));
    }

    (pairs, expected)
}

/// Deals the friendships round-robin into `files` sources.
fn friend_files(pairs: &[(String, String)], files: usize) -> Vec<String> {
    let mut contents = vec![String::new(); files];
    for (i, (a, b)) in pairs.iter().enumerate() {
        contents[i % files].push_str(&format!("addfriends {a} {b}\n"));
    }
    contents
}

fn ingest_texts(texts: &[String]) -> (TempDir, SocialNetwork) {
    let names = (1..=texts.len())
        .map(|i| format!("data-{i}"))
        .collect::<Vec<_>>();
    let files = names
        .iter()
        .zip(texts)
        .map(|(name, text)| (name.as_str(), text.as_str()))
        .collect::<Vec<_>>();
    let (dir, sources) = write_sources(&files);

    let network = SocialNetwork::new();
    assert!(network.ingest(Some(&sources[..])));

    (dir, network)
}

#[test]
fn test_single_user() {
    let (_dir, sources) = write_sources(&[("users", "adduser Sheep\n")]);
    let network = SocialNetwork::new();

    assert!(network.ingest(Some(&sources[..])));

    assert_eq!(network.get_all_users(), set(&["Sheep"]));
}

#[test]
fn test_several_users() {
    let (_dir, sources) = write_sources(&[(
        "users",
        "adduser Ethel\nadduser Franz\nadduser Gertrude\nadduser Wallace\nadduser Elmer\nadduser Doris\n",
    )]);
    let network = SocialNetwork::new();

    assert!(network.ingest(Some(&sources[..])));

    assert_eq!(
        network.get_all_users(),
        set(&["Doris", "Elmer", "Ethel", "Franz", "Gertrude", "Wallace"])
    );
}

#[test]
fn test_single_friendship() {
    let (_dir, sources) = write_sources(&[("friends", "addfriends Aardvark Platypus\n")]);
    let network = SocialNetwork::new();

    assert!(network.ingest(Some(&sources[..])));

    assert_eq!(network.get_all_users(), set(&["Aardvark", "Platypus"]));
    assert_eq!(network.get_friends(Some("Aardvark")), Some(set(&["Platypus"])));
    assert_eq!(network.get_friends(Some("Platypus")), Some(set(&["Aardvark"])));
}

const ZOO: &str = "adduser Sheep
adduser Lion
addfriends Sheep Lion
addfriends Sheep Meerkat
addfriends Sheep Numbat
addfriends Lion Numbat
adduser Walrus
addfriends Meerkat Walrus
addfriends Numbat Penguin
addfriends Numbat Quokka
addfriends Penguin Otter
addfriends Quokka Walrus
";

#[test]
fn test_users_and_friendships() {
    let (_dir, sources) = write_sources(&[("zoo", ZOO)]);
    let network = SocialNetwork::new();

    assert!(network.ingest(Some(&sources[..])));

    assert_eq!(
        network.get_all_users(),
        set(&["Sheep", "Lion", "Meerkat", "Numbat", "Otter", "Penguin", "Quokka", "Walrus"])
    );
    assert_eq!(network.get_friends(Some("Otter")), Some(set(&["Penguin"])));
    assert_eq!(
        network.get_friends(Some("Sheep")),
        Some(set(&["Lion", "Numbat", "Meerkat"]))
    );
    assert_eq!(
        network.get_friends(Some("Numbat")),
        Some(set(&["Sheep", "Lion", "Penguin", "Quokka"]))
    );
    assert_eq!(network.suggestions(Some("Walrus")), Some(set(&["Sheep", "Numbat"])));
}

#[test]
fn test_same_user_from_two_units() {
    let (_dir, sources) = write_sources(&[("users", "adduser Sheep\nadduser Sheep\n")]);
    let twice = vec![sources[0].clone(), sources[0].clone()];
    let network = SocialNetwork::new();

    assert!(network.ingest(Some(&twice[..])));

    assert_eq!(network.get_all_users(), set(&["Sheep"]));
}

#[test]
fn test_same_friendship_from_two_units() {
    let (_dir, sources) = write_sources(&[(
        "friends",
        "addfriends Aardvark Platypus\naddfriends Platypus Aardvark\n",
    )]);
    let twice = vec![sources[0].clone(), sources[0].clone()];
    let network = SocialNetwork::new();

    assert!(network.ingest(Some(&twice[..])));

    assert_eq!(network.get_all_users(), set(&["Aardvark", "Platypus"]));
    assert_eq!(network.get_friends(Some("Aardvark")), Some(set(&["Platypus"])));
    assert_eq!(network.get_friends(Some("Platypus")), Some(set(&["Aardvark"])));
    assert_eq!(network.friendship_edge_count(), 2);
}

#[test]
fn test_many_users_in_two_files() {
    let users = (1..=60).map(|i| format!("person{}", i * 7 % 500 + 1)).collect::<Vec<_>>();
    let texts = users
        .chunks(30)
        .map(|chunk| {
            chunk
                .iter()
                .map(|user| format!("adduser {user}\n"))
                .collect::<String>()
        })
        .collect::<Vec<_>>();

    let (_dir, network) = ingest_texts(&texts);

    assert_eq!(network.get_all_users(), users.into_iter().collect::<HashSet<_>>());
    assert_eq!(network.friendship_edge_count(), 0);
}

#[test]
fn test_friendships_in_two_files() {
    let (pairs, expected) = friendships(30, 40);
    let (_dir, network) = ingest_texts(&friend_files(&pairs, 2));

    assert_eq!(
        network.get_all_users(),
        expected.keys().cloned().collect::<HashSet<_>>()
    );
    for (user, friends) in &expected {
        assert_eq!(network.get_friends(Some(user.as_str())).as_ref(), Some(friends));
    }
}

#[test]
fn test_friendships_in_ten_files() {
    let (pairs, expected) = friendships(30, 50);
    let (_dir, network) = ingest_texts(&friend_files(&pairs, 10));

    assert_eq!(network.user_count(), expected.len());
    assert_eq!(network.friendship_edge_count(), 2 * pairs.len());
    for (user, friends) in &expected {
        assert_eq!(network.get_friends(Some(user.as_str())).as_ref(), Some(friends));
    }
}

#[test]
fn test_overlapping_sources_do_not_duplicate() {
    let (pairs, expected) = friendships(25, 45);

    // every unit sees every friendship, half of them written the other way round
    let texts = (0..16)
        .map(|unit| {
            let mut lines = pairs
                .iter()
                .enumerate()
                .map(|(i, (a, b))| {
                    if (i + unit) % 2 == 0 {
                        format!("addfriends {a} {b}\n")
                    } else {
                        format!("addfriends {b} {a}\n")
                    }
                })
                .collect::<Vec<_>>();
            lines.rotate_left(unit * 3 % pairs.len());
            lines.concat()
        })
        .collect::<Vec<_>>();

    let (_dir, network) = ingest_texts(&texts);

    assert_eq!(network.user_count(), expected.len());
    assert_eq!(network.friendship_edge_count(), 2 * pairs.len());
    for (a, b) in &pairs {
        assert!(network.are_friends(a, b), "{a} and {b} should be friends");
    }
}

#[test]
fn test_unreadable_source_is_skipped() {
    let (dir, mut sources) = write_sources(&[
        ("first", "addfriends Sheep Lion\n"),
        ("second", "addfriends Numbat Penguin\n"),
    ]);
    sources.insert(1, Source::from(dir.path().join("missing")));
    let network = SocialNetwork::new();

    let report = network
        .ingest_with(&sources, &IngestOptions::default())
        .expect("Failed to start ingestion");

    assert_eq!(report.succeeded().count(), 2);
    let failed = report.failed().collect::<Vec<_>>();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].state, UnitState::Failed);
    assert!(matches!(failed[0].error, Some(Error::Io { .. })));
    assert_eq!(network.get_all_users(), set(&["Sheep", "Lion", "Numbat", "Penguin"]));

    assert!(SocialNetwork::new().ingest(Some(&sources[..])));
}

#[test]
fn test_truncated_source_keeps_applied_directives() {
    let (_dir, sources) = write_sources(&[
        ("truncated", "adduser Sheep\naddfriends Sheep Lion\nadduser"),
        ("complete", "addfriends Otter Penguin\n"),
    ]);
    let network = SocialNetwork::new();

    let report = network
        .ingest_with(&sources, &IngestOptions::default())
        .expect("Failed to start ingestion");

    let truncated = &report.outcomes[0];
    assert_eq!(truncated.state, UnitState::Failed);
    assert_eq!(truncated.applied, 2);
    assert!(matches!(
        truncated.error,
        Some(Error::MissingArgument {
            expected: 1,
            found: 0,
            ..
        })
    ));
    assert!(report.outcomes[1].is_done());
    assert_eq!(
        network.get_all_users(),
        set(&["Sheep", "Lion", "Otter", "Penguin"])
    );
}

#[test]
fn test_two_sources_end_to_end() {
    let (_dir, sources) = write_sources(&[
        ("first", "addfriends Sheep Lion\naddfriends Sheep Numbat\n"),
        ("second", "addfriends Numbat Penguin\n"),
    ]);
    let network = SocialNetwork::new();

    assert!(network.ingest(Some(&sources[..])));

    assert_eq!(network.get_all_users(), set(&["Sheep", "Lion", "Numbat", "Penguin"]));
    assert_eq!(network.get_friends(Some("Numbat")), Some(set(&["Sheep", "Penguin"])));
    assert_eq!(network.suggestions(Some("Sheep")), Some(set(&["Penguin"])));
}

#[test]
fn test_report_after_ingestion() {
    let (dir, sources) = write_sources(&[("zoo", ZOO)]);
    let network = SocialNetwork::new();
    network.ingest(Some(&sources[..]));

    let path = dir.path().join("network.ron");
    network.report().write_to(&path).expect("Failed to write report");

    let written = fs::read_to_string(&path).expect("Failed to read report");
    assert_eq!(written, network.report().to_ron().expect("Failed to render report"));
    let numbat = written.find(r#"name: "Numbat""#).expect("Numbat missing from report");
    let otter = written.find(r#"name: "Otter""#).expect("Otter missing from report");
    assert!(numbat < otter);
}

/// Every unit has to hold its stream open before any stream gets data, which
/// only works if all units are live at the same time.
#[cfg(unix)]
#[test]
fn test_all_units_run_at_once() {
    use std::fs::OpenOptions;
    use std::io::Write;
    use std::process::Command;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    const UNITS: usize = 8;

    let dir = tempdir().expect("Failed to create temp dir");
    let paths = (0..UNITS)
        .map(|i| dir.path().join(format!("stream-{i}")))
        .collect::<Vec<_>>();
    for path in &paths {
        let status = Command::new("mkfifo")
            .arg(path)
            .status()
            .expect("Failed to run mkfifo");
        assert!(status.success(), "mkfifo failed for {}", path.display());
    }

    // opening a fifo for writing blocks until a unit opens it for reading
    let writer_paths = paths.clone();
    let writer = thread::spawn(move || {
        let mut streams = writer_paths
            .iter()
            .map(|path| {
                OpenOptions::new()
                    .write(true)
                    .open(path)
                    .expect("Failed to open stream")
            })
            .collect::<Vec<_>>();

        for (i, stream) in streams.iter_mut().enumerate() {
            writeln!(stream, "adduser user{i}").expect("Failed to write stream");
        }
    });

    let sources = paths.into_iter().map(Source::from).collect::<Vec<_>>();
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let network = SocialNetwork::new();
        let ingested = network.ingest(Some(&sources[..]));
        let _ = tx.send((ingested, network));
    });

    let (ingested, network) = rx
        .recv_timeout(Duration::from_secs(10))
        .expect("Ingestion stalled, units were not all running at once");
    writer.join().expect("Writer thread panicked");

    assert!(ingested);
    assert_eq!(
        network.get_all_users(),
        (0..UNITS).map(|i| format!("user{i}")).collect::<HashSet<_>>()
    );
}
