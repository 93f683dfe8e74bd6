//! Explicit session context shared by the views of one front end.
//!
//! Views hold a reference to the [`Session`] they render instead of reading
//! process-wide state, and learn about changes through [`Session::subscribe`].

use crate::attachment::{ImageAttachment, LoadError, LoadOutcome};
use palm_analyze::{condition_color, Color, PlantCondition};
use palm_detect::GeoPoint;
use std::collections::{HashMap, HashSet};

pub type SubscriptionId = u64;

type Callback = Box<dyn FnMut(&SessionEvent) + Send>;

/// State change notifications.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SelectionChanged { ids: Vec<String> },
    FocusChanged { id: Option<String> },
    StatusChanged { id: String },
    /// A finished detection run replaced the attachment's analysis.
    AnalysisReplaced { id: String, condition: PlantCondition },
}

/// What a map layer needs to place and tint one capture.
#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub id:        String,
    pub location:  GeoPoint,
    pub condition: Option<PlantCondition>,
    pub color:     Color,
}

#[derive(Default)]
pub struct Session {
    attachments:  Vec<ImageAttachment>,
    focused:      Option<String>,
    subscribers:  Vec<(SubscriptionId, Callback)>,
    next_sub_id:  SubscriptionId,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection. Attachments whose id was already selected are
    /// kept as they are, load state and analysis included; new ids start
    /// unloaded. Order follows `selection`. Ids are unique: a later entry
    /// repeating an earlier id is dropped.
    pub fn set_selection(&mut self, selection: Vec<ImageAttachment>) {
        let mut existing: HashMap<String, ImageAttachment> = self
            .attachments
            .drain(..)
            .map(|a| (a.id().to_string(), a))
            .collect();

        let mut seen = HashSet::new();
        let mut attachments = Vec::with_capacity(selection.len());
        for fresh in selection {
            if !seen.insert(fresh.id().to_string()) {
                log::warn!("{}: already selected, ignoring {:?}", fresh.id(), fresh.path());
                continue;
            }
            attachments.push(existing.remove(fresh.id()).unwrap_or(fresh));
        }
        self.attachments = attachments;

        let ids = self.ids();
        log::debug!("selection now {} attachments", ids.len());
        self.notify(&SessionEvent::SelectionChanged { ids });

        let focus_lost = self
            .focused
            .as_deref()
            .is_some_and(|id| self.attachment(id).is_none());
        if focus_lost {
            self.focused = None;
            self.notify(&SessionEvent::FocusChanged { id: None });
        }
    }

    pub fn attachments(&self) -> &[ImageAttachment] {
        &self.attachments
    }

    pub fn ids(&self) -> Vec<String> {
        self.attachments.iter().map(|a| a.id().to_string()).collect()
    }

    pub fn attachment(&self, id: &str) -> Option<&ImageAttachment> {
        self.attachments.iter().find(|a| a.id() == id)
    }

    fn attachment_mut(&mut self, id: &str) -> Option<&mut ImageAttachment> {
        self.attachments.iter_mut().find(|a| a.id() == id)
    }

    /// Mark `id` as the capture currently being viewed. Returns `false` if
    /// it is not part of the selection.
    pub fn focus(&mut self, id: &str) -> bool {
        if self.attachment(id).is_none() {
            return false;
        }
        if self.focused.as_deref() != Some(id) {
            self.focused = Some(id.to_string());
            self.notify(&SessionEvent::FocusChanged { id: Some(id.to_string()) });
        }
        true
    }

    pub fn focused(&self) -> Option<&ImageAttachment> {
        self.focused.as_deref().and_then(|id| self.attachment(id))
    }

    /// Ids that have never been loaded or whose last load failed.
    pub fn pending(&self) -> Vec<String> {
        self.attachments
            .iter()
            .filter(|a| a.needs_load())
            .map(|a| a.id().to_string())
            .collect()
    }

    /// Move `id` to `Loading`. Returns `false` if it is unknown or does not
    /// need loading.
    pub fn begin_load(&mut self, id: &str) -> bool {
        let started = match self.attachment_mut(id) {
            Some(a) if a.needs_load() => {
                a.set_loading();
                true
            }
            _ => false,
        };
        if started {
            self.notify(&SessionEvent::StatusChanged { id: id.to_string() });
        }
        started
    }

    /// Record the result of a load. Results for ids no longer selected are
    /// dropped.
    pub fn apply(&mut self, id: &str, result: Result<LoadOutcome, LoadError>) {
        let Some(attachment) = self.attachment_mut(id) else {
            log::debug!("{id}: dropping result, no longer selected");
            return;
        };

        let condition = match &result {
            Ok(outcome) => Some(outcome.analysis.plant_condition()),
            Err(err) => {
                log::warn!("{id}: {err}");
                None
            }
        };
        attachment.complete(result);

        self.notify(&SessionEvent::StatusChanged { id: id.to_string() });
        if let Some(condition) = condition {
            self.notify(&SessionEvent::AnalysisReplaced { id: id.to_string(), condition });
        }
    }

    /// Markers for every geotagged attachment; gray until analysed.
    pub fn markers(&self) -> Vec<MapMarker> {
        self.attachments
            .iter()
            .filter_map(|a| {
                let location = a.location()?;
                let condition = a.condition();
                Some(MapMarker {
                    id: a.id().to_string(),
                    location,
                    condition,
                    color: condition_color(condition),
                })
            })
            .collect()
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&SessionEvent) + Send + 'static,
    {
        let id = self.next_sub_id;
        self.next_sub_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    fn notify(&mut self, event: &SessionEvent) {
        for (_, callback) in self.subscribers.iter_mut() {
            callback(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachment::Finished;
    use palm_analyze::{Analysis, BoundingBox, Observation};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn outcome(labels: &[&str]) -> LoadOutcome {
        LoadOutcome {
            finished: Finished { width: 1, height: 1, elapsed: Duration::ZERO },
            analysis: Analysis::new(
                labels.iter().map(|l| Observation::new(*l, 0.9, BoundingBox::default())).collect(),
            ),
        }
    }

    fn recorder(session: &mut Session) -> Arc<Mutex<Vec<SessionEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        session.subscribe(move |e| sink.lock().unwrap().push(e.clone()));
        events
    }

    #[test]
    fn reselection_keeps_loaded_attachments() {
        let mut s = Session::new();
        s.set_selection(vec![ImageAttachment::new("a.png"), ImageAttachment::new("b.png")]);
        assert!(s.begin_load("a.png"));
        s.apply("a.png", Ok(outcome(&["healthy"])));

        s.set_selection(vec![ImageAttachment::new("c.png"), ImageAttachment::new("a.png")]);
        assert_eq!(s.ids(), vec!["c.png", "a.png"]);
        assert!(s.attachment("a.png").unwrap().status().unwrap().is_finished());
        assert_eq!(s.pending(), vec!["c.png"]);
    }

    #[test]
    fn repeated_file_names_keep_the_first() {
        let mut s = Session::new();
        s.set_selection(vec![
            ImageAttachment::new("flight_1/a.png"),
            ImageAttachment::new("flight_2/a.png"),
            ImageAttachment::new("flight_2/b.png"),
        ]);
        assert_eq!(s.ids(), vec!["a.png", "b.png"]);
        assert_eq!(s.attachment("a.png").unwrap().path(), std::path::Path::new("flight_1/a.png"));

        assert!(s.begin_load("a.png"));
        s.apply("a.png", Ok(outcome(&["healthy"])));
        assert_eq!(s.pending(), vec!["b.png"]);
    }

    #[test]
    fn begin_load_only_once() {
        let mut s = Session::new();
        s.set_selection(vec![ImageAttachment::new("a.png")]);
        assert!(s.begin_load("a.png"));
        assert!(!s.begin_load("a.png"));
        assert!(!s.begin_load("missing.png"));
    }

    #[test]
    fn focus_is_cleared_when_deselected() {
        let mut s = Session::new();
        s.set_selection(vec![ImageAttachment::new("a.png")]);
        assert!(!s.focus("b.png"));
        assert!(s.focus("a.png"));
        assert_eq!(s.focused().map(|a| a.id()), Some("a.png"));

        let events = recorder(&mut s);
        s.set_selection(vec![ImageAttachment::new("b.png")]);
        assert!(s.focused().is_none());
        assert_eq!(
            events.lock().unwrap().last(),
            Some(&SessionEvent::FocusChanged { id: None })
        );
    }

    #[test]
    fn events_follow_a_load() {
        let mut s = Session::new();
        s.set_selection(vec![ImageAttachment::new("a.png")]);
        let events = recorder(&mut s);

        s.begin_load("a.png");
        s.apply("a.png", Ok(outcome(&["ganoderma"])));

        assert_eq!(
            *events.lock().unwrap(),
            vec![
                SessionEvent::StatusChanged { id: "a.png".into() },
                SessionEvent::StatusChanged { id: "a.png".into() },
                SessionEvent::AnalysisReplaced { id: "a.png".into(), condition: PlantCondition::Sick },
            ]
        );
    }

    #[test]
    fn unsubscribed_callbacks_are_silent() {
        let mut s = Session::new();
        let hits = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&hits);
        let sub = s.subscribe(move |_| *sink.lock().unwrap() += 1);
        s.set_selection(vec![ImageAttachment::new("a.png")]);
        assert!(s.unsubscribe(sub));
        assert!(!s.unsubscribe(sub));
        s.set_selection(vec![]);
        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[test]
    fn results_for_deselected_ids_are_dropped() {
        let mut s = Session::new();
        s.set_selection(vec![ImageAttachment::new("a.png")]);
        s.apply("gone.png", Ok(outcome(&["healthy"])));
        assert_eq!(s.attachments().len(), 1);
    }

    #[test]
    fn markers_are_gray_until_finished() {
        let here = GeoPoint { latitude: 1.0, longitude: 2.0 };
        let mut s = Session::new();
        s.set_selection(vec![
            ImageAttachment::new("a.png").with_location(Some(here)),
            ImageAttachment::new("b.png").with_location(Some(here)),
            ImageAttachment::new("nogps.png"),
        ]);
        s.begin_load("a.png");
        s.apply("a.png", Ok(outcome(&["healthy", "nitrogen"])));

        let markers = s.markers();
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].condition, Some(PlantCondition::Malnutrition));
        assert_eq!(markers[0].color, Color::Orange);
        assert_eq!(markers[1].condition, None);
        assert_eq!(markers[1].color, Color::Gray);
    }
}
