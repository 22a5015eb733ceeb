use std::convert::Infallible;

use askama::Template;
use axum::{
    extract::{Path, State},
    response::{
        sse::{Event, KeepAlive, Sse},
        Html,
    },
};
use futures::stream::{self, Stream};
use reqwest::Url;
use tracing::debug;

use crate::backend_client::is_path_segment;
use crate::errors::AppError;
use crate::polling::{PollHandle, ResultsView};
use crate::render::{ResultsPage, ResultsPanel};
use crate::state::AppState;

/// Path of the results view for `job_id`, with the id percent-encoded.
/// `None` for ids that cannot stand as a single path segment.
pub fn results_path(job_id: &str) -> Option<String> {
    if !is_path_segment(job_id) {
        return None;
    }
    let mut url = Url::parse("http://localhost/results").ok()?;
    url.path_segments_mut().ok()?.push(job_id);
    Some(url.path().to_string())
}

/// GET /results/:job_id
///
/// Renders the shell in its loading state; live updates arrive over `/events`.
pub async fn handle_results_page(Path(job_id): Path<String>) -> Result<Html<String>, AppError> {
    let panel = ResultsPanel::from_view(&ResultsView::Loading).render()?;
    Ok(Html(ResultsPage { job_id, panel }.render()?))
}

/// GET /results/:job_id/events
///
/// One `view` event per view change, then a single `end` event once the view is
/// terminal. The poll task is owned by the stream: when the client goes away
/// the stream is dropped and the next scheduled fetch is cancelled.
pub async fn handle_results_events(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let handle = state.poller.watch(job_id);
    Sse::new(view_events(handle)).keep_alive(KeepAlive::default())
}

enum Feed {
    Open(PollHandle),
    Closing,
}

fn view_events(handle: PollHandle) -> impl Stream<Item = Result<Event, Infallible>> {
    stream::unfold(Some(Feed::Open(handle)), |feed| async move {
        match feed? {
            Feed::Open(mut handle) => match handle.changed().await {
                Some(view) => {
                    let next = if view.is_terminal() {
                        debug!("results view for {} settled", handle.job_id());
                        Feed::Closing
                    } else {
                        Feed::Open(handle)
                    };
                    Some((Ok::<_, Infallible>(view_event(&view)), Some(next)))
                }
                None => Some((Ok(end_event()), None)),
            },
            Feed::Closing => Some((Ok(end_event()), None)),
        }
    })
}

fn view_event(view: &ResultsView) -> Event {
    let html = ResultsPanel::from_view(view).render().unwrap_or_else(|e| {
        tracing::error!("Template error: {e}");
        "<p>Failed to render results</p>".to_string()
    });
    // SSE fields may not carry carriage returns; newlines are split into data lines.
    Event::default().event("view").data(html.replace('\r', ""))
}

fn end_event() -> Event {
    Event::default().event("end").data("")
}
