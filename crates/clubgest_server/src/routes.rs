//! Path matching for the HTTP surface.
//!
//! Every route is reachable both at its bare path and under `/api`. Path ids
//! are captured as raw text; handlers turn them into validated ids so a
//! malformed id answers 400 instead of 404.

use once_cell::sync::Lazy;
use regex::Regex;

static ROUTE_TABLE: Lazy<Vec<(Regex, RouteKind)>> = Lazy::new(|| {
    [
        (r"^/status$", RouteKind::Status),
        (r"^/players$", RouteKind::Players),
        (r"^/players/([^/]+)$", RouteKind::Player),
        (r"^/sessions$", RouteKind::Sessions),
        (r"^/sessions/([^/]+)$", RouteKind::Session),
        (r"^/sessions/([^/]+)/active$", RouteKind::SessionActive),
        (r"^/attendance$", RouteKind::Attendance),
        (r"^/attendance/session/([^/]+)$", RouteKind::AttendanceBySession),
        (r"^/attendance/player/([^/]+)/stats$", RouteKind::AttendanceStats),
        (r"^/attendance/player/([^/]+)$", RouteKind::AttendanceByPlayer),
        (r"^/attendance/([^/]+)/([^/]+)$", RouteKind::AttendancePair),
    ]
    .into_iter()
    .map(|(pattern, kind)| (Regex::new(pattern).expect("valid route regex"), kind))
    .collect()
});

#[derive(Debug, Clone, Copy)]
enum RouteKind {
    Status,
    Players,
    Player,
    Sessions,
    Session,
    SessionActive,
    Attendance,
    AttendanceBySession,
    AttendanceByPlayer,
    AttendanceStats,
    AttendancePair,
}

/// A matched route with its raw path parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Status,
    Players,
    Player(String),
    Sessions,
    Session(String),
    SessionActive(String),
    Attendance,
    AttendanceBySession(String),
    AttendanceByPlayer(String),
    AttendanceStats(String),
    AttendancePair { player: String, session: String },
}

pub fn match_route(path: &str) -> Option<Route> {
    let path = normalize(path);
    ROUTE_TABLE.iter().find_map(|(regex, kind)| {
        let captures = regex.captures(path)?;
        let param = |index: usize| {
            captures
                .get(index)
                .map(|found| found.as_str().to_string())
                .unwrap_or_default()
        };
        Some(match kind {
            RouteKind::Status => Route::Status,
            RouteKind::Players => Route::Players,
            RouteKind::Player => Route::Player(param(1)),
            RouteKind::Sessions => Route::Sessions,
            RouteKind::Session => Route::Session(param(1)),
            RouteKind::SessionActive => Route::SessionActive(param(1)),
            RouteKind::Attendance => Route::Attendance,
            RouteKind::AttendanceBySession => Route::AttendanceBySession(param(1)),
            RouteKind::AttendanceByPlayer => Route::AttendanceByPlayer(param(1)),
            RouteKind::AttendanceStats => Route::AttendanceStats(param(1)),
            RouteKind::AttendancePair => Route::AttendancePair {
                player: param(1),
                session: param(2),
            },
        })
    })
}

fn normalize(path: &str) -> &str {
    let path = match path.strip_prefix("/api") {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => path,
    };
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attendance_routes_match_with_and_without_prefix() {
        for prefix in ["", "/api"] {
            assert_eq!(
                match_route(&format!("{prefix}/attendance")),
                Some(Route::Attendance)
            );
            assert_eq!(
                match_route(&format!("{prefix}/attendance/session/4")),
                Some(Route::AttendanceBySession("4".into()))
            );
            assert_eq!(
                match_route(&format!("{prefix}/attendance/player/7")),
                Some(Route::AttendanceByPlayer("7".into()))
            );
            assert_eq!(
                match_route(&format!("{prefix}/attendance/player/7/stats")),
                Some(Route::AttendanceStats("7".into()))
            );
            assert_eq!(
                match_route(&format!("{prefix}/attendance/3/9")),
                Some(Route::AttendancePair {
                    player: "3".into(),
                    session: "9".into()
                })
            );
        }
    }

    #[test]
    fn trailing_slash_is_ignored() {
        assert_eq!(match_route("/players/"), Some(Route::Players));
        assert_eq!(match_route("/api/status/"), Some(Route::Status));
    }

    #[test]
    fn unknown_paths_do_not_match() {
        assert_eq!(match_route("/"), None);
        assert_eq!(match_route("/apiplayers"), None);
        assert_eq!(match_route("/attendance/1/2/3"), None);
        assert_eq!(match_route("/api/api/players"), None);
    }

    #[test]
    fn session_active_flag_has_its_own_route() {
        assert_eq!(
            match_route("/api/sessions/12/active"),
            Some(Route::SessionActive("12".into()))
        );
        assert_eq!(match_route("/sessions/12"), Some(Route::Session("12".into())));
    }

    #[test]
    fn raw_ids_are_kept_for_validation() {
        assert_eq!(
            match_route("/players/abc"),
            Some(Route::Player("abc".into()))
        );
    }
}
