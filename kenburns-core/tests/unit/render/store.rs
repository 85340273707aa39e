use super::*;

fn root(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("kenburns_store_{name}_{}", std::process::id()))
}

#[test]
fn paths_are_partitioned_by_image_index() {
    let store = FrameStore::create(&root("paths")).unwrap();
    assert_eq!(
        store.frame_path(2, 17),
        store.dir().join("image_002").join("frame_00017.png")
    );
    assert_eq!(
        store.frame_pattern(2),
        store.dir().join("image_002").join("frame_%05d.png")
    );
    assert_eq!(store.clip_path(11), store.dir().join("clip_011.mp4"));
    assert_ne!(store.image_dir(0), store.image_dir(1));
}

#[test]
fn separate_requests_get_separate_namespaces() {
    let base = root("namespaces");
    let a = FrameStore::create(&base).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(2));
    let b = FrameStore::create(&base).unwrap();
    assert_ne!(a.dir(), b.dir());
    assert_ne!(a.frame_path(0, 0), b.frame_path(0, 0));
}

#[test]
fn prepare_batch_discards_stale_frames() {
    let store = FrameStore::create(&root("stale")).unwrap();
    let dir = store.prepare_batch(0).unwrap();
    std::fs::write(store.frame_path(0, 99), b"stale").unwrap();

    let again = store.prepare_batch(0).unwrap();
    assert_eq!(dir, again);
    assert!(again.is_dir());
    assert!(!store.frame_path(0, 99).exists());
}

#[test]
fn release_batch_only_touches_its_index() {
    let store = FrameStore::create(&root("release")).unwrap();
    store.prepare_batch(0).unwrap();
    store.prepare_batch(1).unwrap();
    store.release_batch(0).unwrap();
    assert!(!store.image_dir(0).exists());
    assert!(store.image_dir(1).exists());
    store.release_batch(5).unwrap();
}

#[test]
fn drop_removes_the_namespace_unless_kept() {
    let base = root("drop");
    let dir = {
        let store = FrameStore::create(&base).unwrap();
        store.prepare_batch(0).unwrap();
        store.dir().to_path_buf()
    };
    assert!(!dir.exists());

    let kept = {
        let mut store = FrameStore::create(&base).unwrap();
        store.keep();
        store.dir().to_path_buf()
    };
    assert!(kept.exists());
    std::fs::remove_dir_all(kept).unwrap();
}
