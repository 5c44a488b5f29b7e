//! Per-group upload state machine and batcher.

use std::collections::VecDeque;
use std::path::Path;

use crate::alert::{AlertChannel, NotifierGate};
use crate::clock::Clock;
use crate::config::{Config, LimitsConfig};
use crate::download::RunStats;
use crate::error::{Error, Result};
use crate::fs::media_path;
use crate::store::{ContentItem, FailureKind, PostGroup, UploadOutcome};
use crate::upload::caption::{build_caption, build_link_text};
use crate::upload::publisher::{MessageId, Publisher};
use crate::upload::staging::StagedMedia;

/// Files staged for one outgoing message, with the items they belong to.
struct Batch {
    members: Vec<usize>,
    media: Vec<StagedMedia>,
}

pub struct Uploader<'a> {
    publisher: &'a dyn Publisher,
    alerts: &'a dyn AlertChannel,
    gate: NotifierGate<'a>,
    clock: &'a dyn Clock,
    limits: &'a LimitsConfig,
    batches_per_group: usize,
    download_dir: &'a Path,
}

impl<'a> Uploader<'a> {
    pub fn new(
        publisher: &'a dyn Publisher,
        alerts: &'a dyn AlertChannel,
        clock: &'a dyn Clock,
        config: &'a Config,
        download_dir: &'a Path,
    ) -> Self {
        Self {
            publisher,
            alerts,
            gate: NotifierGate::new(alerts, clock, config.options.error_excerpt_chars),
            clock,
            limits: &config.limits,
            batches_per_group: config.options.batches_per_group,
            download_dir,
        }
    }

    /// Whether `item` should be published in this run.
    ///
    /// Blocked items are never published; their first observation alerts
    /// through the gate.
    pub async fn should_upload(&self, item: &mut ContentItem) -> bool {
        if item.uploaded {
            return false;
        }

        if self.gate.observe_blocking(item).await {
            return false;
        }

        item.is_special() || item.downloaded
    }

    /// Publish every eligible item of one post group.
    ///
    /// Errors never escape; each one ends up as an upload outcome on the
    /// items it concerns.
    pub async fn process_group(
        &self,
        items: &mut [ContentItem],
        group: &PostGroup,
        stats: &mut RunStats,
    ) {
        let mut links = Vec::new();
        let mut media = VecDeque::new();

        for &idx in &group.members {
            let item = &mut items[idx];
            if !self.should_upload(item).await {
                if item.is_blocked() && !item.uploaded {
                    stats.blocked += 1;
                }
                continue;
            }

            if item.is_special() {
                links.push(idx);
            } else {
                media.push_back(idx);
            }
        }

        for idx in links {
            self.publish_link(&mut items[idx], stats).await;
        }

        let mut batches_sent = 0;
        while !media.is_empty() && batches_sent < self.batches_per_group {
            let batch = self.assemble_batch(items, &mut media, stats).await;
            if batch.members.is_empty() {
                continue;
            }

            batches_sent += 1;
            if !self.publish_batch(items, batch, stats).await {
                break;
            }
        }

        if !media.is_empty() {
            stats.deferred += media.len() as u64;
            tracing::warn!(
                "Deferring {} file(s) of post {} to a later run",
                media.len(),
                group.post_id.as_deref().unwrap_or("-")
            );
        }
    }

    async fn publish_link(&self, item: &mut ContentItem, stats: &mut RunStats) {
        let text = build_link_text(item, self.limits.caption_chars);

        match self.publisher.send_text(&text).await {
            Ok(message_id) => {
                self.mark_published(item, message_id);
                stats.published += 1;
                self.alerts.announce(&text).await;
            }
            Err(e) => {
                self.gate.record_upload_failure(item, &e).await;
                stats.publish_failed += 1;
            }
        }
    }

    /// Take candidates off the front of `pending` until the batch is full.
    ///
    /// Candidates that cannot be staged get their own failure outcome and
    /// are left out; the caption goes to the first file actually staged.
    async fn assemble_batch(
        &self,
        items: &mut [ContentItem],
        pending: &mut VecDeque<usize>,
        stats: &mut RunStats,
    ) -> Batch {
        let mut batch = Batch {
            members: Vec::new(),
            media: Vec::new(),
        };

        while batch.media.len() < self.limits.media_group_size {
            let Some(idx) = pending.pop_front() else {
                break;
            };
            let item = &mut items[idx];

            let caption = batch
                .media
                .is_empty()
                .then(|| build_caption(item, self.limits.caption_chars));

            match self.stage(item, caption).await {
                Ok(staged) => {
                    batch.members.push(idx);
                    batch.media.push(staged);
                }
                Err(e) => match self.gate.record_upload_failure(item, &e).await {
                    FailureKind::FileTooLarge => stats.oversize += 1,
                    _ => stats.publish_failed += 1,
                },
            }
        }

        batch
    }

    async fn stage(&self, item: &ContentItem, caption: Option<String>) -> Result<StagedMedia> {
        let path = media_path(self.download_dir, item)?;
        StagedMedia::stage(&path, item, self.limits, caption).await
    }

    /// Publish one batch; returns whether it succeeded.
    async fn publish_batch(
        &self,
        items: &mut [ContentItem],
        batch: Batch,
        stats: &mut RunStats,
    ) -> bool {
        let Batch { members, mut media } = batch;
        let submitted = media.len();
        tracing::info!("Publishing {} file(s)", submitted);

        let result = if submitted == 1 {
            let single = media.remove(0);
            self.publisher.send_single(single).await.map(|id| vec![id])
        } else {
            self.publisher.send_batch(media).await
        };

        let result = result.and_then(|ids| {
            if ids.len() == submitted {
                Ok(ids)
            } else {
                Err(Error::BatchMismatch {
                    submitted,
                    received: ids.len(),
                })
            }
        });

        match result {
            Ok(ids) => {
                for (&idx, message_id) in members.iter().zip(ids) {
                    self.mark_published(&mut items[idx], message_id);
                    stats.published += 1;
                }
                true
            }
            Err(e) => {
                for &idx in &members {
                    let item = &mut items[idx];
                    if item.uploaded {
                        continue;
                    }
                    self.gate.record_upload_failure(item, &e).await;
                    stats.publish_failed += 1;
                }
                false
            }
        }
    }

    fn mark_published(&self, item: &mut ContentItem, message_id: MessageId) {
        item.uploaded = true;
        item.upload_info = Some(UploadOutcome::Success {
            message_id,
            timestamp: self.clock.now(),
        });
        tracing::info!("Published: {} (message {})", item.file_name, message_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{group_by_post, BlockingCondition, MediaKind};
    use crate::test_utils::{
        downloaded_item, fixed_time, FakePublisher, FixedClock, PublishCall, RecordingAlerts,
    };

    fn small_limits() -> Config {
        let mut config = Config::default();
        config.limits.image_bytes = 100;
        config.limits.video_bytes = 1000;
        config
    }

    #[tokio::test]
    async fn scenario_oversize_member_is_left_out_of_batch() {
        let dir = tempfile::tempdir().unwrap();
        let mut items = vec![
            downloaded_item(dir.path(), "a.jpg", "p1", MediaKind::Image, 10),
            downloaded_item(dir.path(), "b.jpg", "p1", MediaKind::Image, 500),
            downloaded_item(dir.path(), "c.jpg", "p1", MediaKind::Image, 10),
        ];
        let groups = group_by_post(&items);

        let config = small_limits();
        let publisher = FakePublisher::default();
        let alerts = RecordingAlerts::default();
        let clock = FixedClock::default();
        let uploader = Uploader::new(&publisher, &alerts, &clock, &config, dir.path());
        let mut stats = RunStats::default();

        uploader.process_group(&mut items, &groups[0], &mut stats).await;

        assert_eq!(
            publisher.calls(),
            vec![PublishCall::Batch(vec![
                ("a.jpg".into(), Some(build_caption(&items[0], 1024))),
                ("c.jpg".into(), None),
            ])]
        );

        let id_a = match &items[0].upload_info {
            Some(UploadOutcome::Success { message_id, .. }) => *message_id,
            other => panic!("unexpected outcome {:?}", other),
        };
        let id_c = match &items[2].upload_info {
            Some(UploadOutcome::Success { message_id, .. }) => *message_id,
            other => panic!("unexpected outcome {:?}", other),
        };
        assert_ne!(id_a, id_c);

        assert!(!items[1].uploaded);
        assert!(matches!(
            items[1].upload_info,
            Some(UploadOutcome::Failure {
                error_type: FailureKind::FileTooLarge,
                ..
            })
        ));
        assert_eq!(alerts.alerts().len(), 1);
        assert_eq!(stats.published, 2);
        assert_eq!(stats.oversize, 1);

        // A second pass sends nothing and alerts nothing.
        let mut stats = RunStats::default();
        uploader.process_group(&mut items, &groups[0], &mut stats).await;
        assert_eq!(publisher.calls().len(), 1);
        assert_eq!(alerts.alerts().len(), 1);
        assert_eq!(stats.blocked, 1);
    }

    #[tokio::test]
    async fn mismatched_confirmation_fails_whole_batch() {
        let dir = tempfile::tempdir().unwrap();
        let mut items = vec![
            downloaded_item(dir.path(), "a.jpg", "p1", MediaKind::Image, 10),
            downloaded_item(dir.path(), "b.mp4", "p1", MediaKind::Video, 10),
        ];
        let groups = group_by_post(&items);

        let config = small_limits();
        let publisher = FakePublisher::default().dropping_confirmation();
        let alerts = RecordingAlerts::default();
        let clock = FixedClock::default();
        let uploader = Uploader::new(&publisher, &alerts, &clock, &config, dir.path());
        let mut stats = RunStats::default();

        uploader.process_group(&mut items, &groups[0], &mut stats).await;

        for item in &items {
            assert!(!item.uploaded);
            assert!(!item.downloaded);
            assert!(matches!(
                item.upload_info,
                Some(UploadOutcome::Failure {
                    error_type: FailureKind::ApiError,
                    ..
                })
            ));
        }
        assert_eq!(stats.publish_failed, 2);
        assert_eq!(alerts.alerts().len(), 2);
    }

    #[tokio::test]
    async fn single_file_uses_single_send() {
        let dir = tempfile::tempdir().unwrap();
        let mut items = vec![downloaded_item(dir.path(), "a.jpg", "p1", MediaKind::Image, 10)];
        let groups = group_by_post(&items);

        let config = small_limits();
        let publisher = FakePublisher::default();
        let alerts = RecordingAlerts::default();
        let clock = FixedClock::default();
        let uploader = Uploader::new(&publisher, &alerts, &clock, &config, dir.path());

        uploader
            .process_group(&mut items, &groups[0], &mut RunStats::default())
            .await;

        assert!(matches!(publisher.calls()[0], PublishCall::Single(ref name, Some(_)) if name == "a.jpg"));
        assert_eq!(
            items[0].upload_info,
            Some(UploadOutcome::Success {
                message_id: 100,
                timestamp: fixed_time(),
            })
        );
    }

    #[tokio::test]
    async fn overflow_beyond_group_size_is_deferred() {
        let dir = tempfile::tempdir().unwrap();
        let mut items: Vec<_> = (0..5)
            .map(|i| downloaded_item(dir.path(), &format!("{}.jpg", i), "p1", MediaKind::Image, 10))
            .collect();
        let groups = group_by_post(&items);

        let mut config = small_limits();
        config.limits.media_group_size = 3;
        let publisher = FakePublisher::default();
        let alerts = RecordingAlerts::default();
        let clock = FixedClock::default();
        let uploader = Uploader::new(&publisher, &alerts, &clock, &config, dir.path());
        let mut stats = RunStats::default();

        uploader.process_group(&mut items, &groups[0], &mut stats).await;
        assert_eq!(stats.published, 3);
        assert_eq!(stats.deferred, 2);
        assert!(!items[3].uploaded && items[3].upload_info.is_none());

        // The next run picks up the rest.
        let mut stats = RunStats::default();
        uploader.process_group(&mut items, &groups[0], &mut stats).await;
        assert_eq!(stats.published, 2);
        assert!(items.iter().all(|i| i.uploaded));
    }

    #[tokio::test]
    async fn several_batches_per_group_when_configured() {
        let dir = tempfile::tempdir().unwrap();
        let mut items: Vec<_> = (0..5)
            .map(|i| downloaded_item(dir.path(), &format!("{}.jpg", i), "p1", MediaKind::Image, 10))
            .collect();
        let groups = group_by_post(&items);

        let mut config = small_limits();
        config.limits.media_group_size = 3;
        config.options.batches_per_group = 2;
        let publisher = FakePublisher::default();
        let alerts = RecordingAlerts::default();
        let clock = FixedClock::default();
        let uploader = Uploader::new(&publisher, &alerts, &clock, &config, dir.path());
        let mut stats = RunStats::default();

        uploader.process_group(&mut items, &groups[0], &mut stats).await;

        assert_eq!(publisher.calls().len(), 2);
        assert_eq!(stats.published, 5);
        assert_eq!(stats.deferred, 0);
    }

    #[tokio::test]
    async fn link_items_are_sent_as_text_and_announced() {
        let dir = tempfile::tempdir().unwrap();
        let mut link = ContentItem::new(
            "space_1",
            Some("p1".into()),
            MediaKind::Space,
            "https://x.example.com/i/spaces/1",
        );
        link.user.screen_name = "alice".into();
        let mut items = vec![link];
        let groups = group_by_post(&items);

        let config = small_limits();
        let publisher = FakePublisher::default();
        let alerts = RecordingAlerts::default();
        let clock = FixedClock::default();
        let uploader = Uploader::new(&publisher, &alerts, &clock, &config, dir.path());

        uploader
            .process_group(&mut items, &groups[0], &mut RunStats::default())
            .await;

        assert!(items[0].uploaded);
        assert!(matches!(publisher.calls()[0], PublishCall::Text(ref t) if t.starts_with("#alice #spaces")));
        assert_eq!(alerts.announcements().len(), 1);
        assert!(alerts.alerts().is_empty());
    }

    fn space_link(post: &str) -> ContentItem {
        let mut link = ContentItem::new(
            "space_1",
            Some(post.into()),
            MediaKind::Space,
            "https://x.example.com/i/spaces/1",
        );
        link.user.screen_name = "alice".into();
        link
    }

    #[tokio::test]
    async fn link_goes_out_before_media_of_same_post() {
        let dir = tempfile::tempdir().unwrap();
        let mut items = vec![
            space_link("p1"),
            downloaded_item(dir.path(), "a.jpg", "p1", MediaKind::Image, 10),
            downloaded_item(dir.path(), "b.jpg", "p1", MediaKind::Image, 10),
        ];
        let groups = group_by_post(&items);
        assert_eq!(groups.len(), 1);

        let config = small_limits();
        let link_text = build_link_text(&items[0], config.limits.caption_chars);
        let caption = build_caption(&items[1], config.limits.caption_chars);
        let publisher = FakePublisher::default();
        let alerts = RecordingAlerts::default();
        let clock = FixedClock::default();
        let uploader = Uploader::new(&publisher, &alerts, &clock, &config, dir.path());

        let mut stats = RunStats::default();
        uploader.process_group(&mut items, &groups[0], &mut stats).await;

        assert_eq!(
            publisher.calls(),
            vec![
                PublishCall::Text(link_text.clone()),
                PublishCall::Batch(vec![
                    ("a.jpg".to_string(), Some(caption)),
                    ("b.jpg".to_string(), None),
                ]),
            ]
        );
        assert!(items.iter().all(|i| i.uploaded));
        assert_eq!(stats.published, 3);
        assert_eq!(alerts.announcements(), vec![link_text]);
    }

    #[tokio::test]
    async fn failed_link_is_recorded_and_not_announced() {
        let dir = tempfile::tempdir().unwrap();
        let mut link = space_link("p1");
        link.downloaded = true;
        let mut items = vec![link];
        let groups = group_by_post(&items);

        let config = small_limits();
        let publisher = FakePublisher::default().failing("Bad Request: chat not found");
        let alerts = RecordingAlerts::default();
        let clock = FixedClock::default();
        let uploader = Uploader::new(&publisher, &alerts, &clock, &config, dir.path());

        let mut stats = RunStats::default();
        uploader.process_group(&mut items, &groups[0], &mut stats).await;

        assert_eq!(stats.publish_failed, 1);
        assert!(!items[0].uploaded);
        assert!(!items[0].downloaded);
        assert!(matches!(
            items[0].upload_info,
            Some(UploadOutcome::Failure { error_type: FailureKind::ApiError, ref message, .. })
                if message.contains("chat not found")
        ));
        assert_eq!(alerts.alerts().len(), 1);
        assert!(alerts.announcements().is_empty());
    }

    #[tokio::test]
    async fn publish_error_alerts_every_time() {
        let dir = tempfile::tempdir().unwrap();
        let mut items = vec![downloaded_item(dir.path(), "a.jpg", "p1", MediaKind::Image, 10)];
        let groups = group_by_post(&items);

        let config = small_limits();
        let publisher = FakePublisher::default().failing("Bad Request: chat not found");
        let alerts = RecordingAlerts::default();
        let clock = FixedClock::default();
        let uploader = Uploader::new(&publisher, &alerts, &clock, &config, dir.path());

        uploader
            .process_group(&mut items, &groups[0], &mut RunStats::default())
            .await;
        assert!(!items[0].downloaded);

        items[0].downloaded = true;
        uploader
            .process_group(&mut items, &groups[0], &mut RunStats::default())
            .await;

        assert_eq!(alerts.alerts().len(), 2);
        assert!(items[0].blocking.is_none());
    }

    #[tokio::test]
    async fn blocked_item_alerts_once_and_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut item = ContentItem::new("a.jpg", Some("p1".into()), MediaKind::Image, "https://e.x/a");
        item.blocking = Some(BlockingCondition {
            kind: FailureKind::MaxDownloadAttempts,
            message: "download failed 10 times in a row".into(),
            timestamp: fixed_time(),
            notification_sent: false,
        });
        let mut items = vec![item];
        let groups = group_by_post(&items);

        let config = small_limits();
        let publisher = FakePublisher::default();
        let alerts = RecordingAlerts::default();
        let clock = FixedClock::default();
        let uploader = Uploader::new(&publisher, &alerts, &clock, &config, dir.path());

        for _ in 0..2 {
            uploader
                .process_group(&mut items, &groups[0], &mut RunStats::default())
                .await;
        }

        assert!(publisher.calls().is_empty());
        assert_eq!(alerts.alerts().len(), 1);
        assert!(items[0].blocking.as_ref().unwrap().notification_sent);
    }

    #[tokio::test]
    async fn undownloaded_item_is_not_eligible() {
        let dir = tempfile::tempdir().unwrap();
        let config = small_limits();
        let publisher = FakePublisher::default();
        let alerts = RecordingAlerts::default();
        let clock = FixedClock::default();
        let uploader = Uploader::new(&publisher, &alerts, &clock, &config, dir.path());

        let mut item = ContentItem::new("a.jpg", Some("p1".into()), MediaKind::Image, "https://e.x/a");
        assert!(!uploader.should_upload(&mut item).await);

        let mut link = ContentItem::new("b", None, MediaKind::Broadcast, "https://e.x/b");
        assert!(uploader.should_upload(&mut link).await);
    }
}
