// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn layout_is_rooted_at_ai_sessions() {
    let repo = Path::new("/work/proj");
    assert_eq!(sessions_root(repo), Path::new("/work/proj/.ai-sessions"));
    assert_eq!(active_dir(repo), Path::new("/work/proj/.ai-sessions/active"));
    assert_eq!(
        completed_dir(repo),
        Path::new("/work/proj/.ai-sessions/completed")
    );
}

#[test]
fn session_paths_carry_md_extension() {
    let repo = Path::new("/r");
    assert_eq!(
        active_session(repo, "2026-08-02-ab12cd34"),
        Path::new("/r/.ai-sessions/active/2026-08-02-ab12cd34.md")
    );
    assert_eq!(
        completed_session(repo, "2026-08-02-ab12cd34"),
        Path::new("/r/.ai-sessions/completed/2026-08-02-ab12cd34.md")
    );
}

#[test]
fn internal_files_are_dot_prefixed() {
    let repo = Path::new("/r");
    assert_eq!(
        current_id_marker(repo),
        Path::new("/r/.ai-sessions/active/.current-id")
    );
    assert_eq!(
        session_map(repo),
        Path::new("/r/.ai-sessions/active/.session-map.json")
    );
    assert_eq!(
        comod_cache(repo),
        Path::new("/r/.ai-sessions/.comod-cache.json")
    );
    assert_eq!(last_sync(repo), Path::new("/r/.ai-sessions/.last-sync"));
}

#[test]
fn session_id_of_strips_extension() {
    assert_eq!(
        session_id_of(Path::new("/r/.ai-sessions/completed/2026-08-02-ab12cd34.md")),
        Some("2026-08-02-ab12cd34")
    );
}
