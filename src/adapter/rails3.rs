//! Rails 3.x adapter

use super::{AdapterDescriptor, AdapterId, DetectionRule, WebCommandPlan, DISPATCHER_PROCESS};

pub fn descriptor() -> AdapterDescriptor {
    AdapterDescriptor::new(AdapterId::Rails3)
        .extends(AdapterId::Rails2)
        .detected_by(DetectionRule::version_range("railties", (3, 0, 0), (4, 0, 0)))
        .process_type("web", DISPATCHER_PROCESS)
        .process_type("console", "bundle exec rails console")
        .web_command(
            WebCommandPlan::new("bundle exec rails server -p $PORT")
                .probe(
                    "thin",
                    "bundle exec thin start -R config.ru -e $RAILS_ENV -p $PORT",
                )
                .probe("puma", "bundle exec rails server puma -p $PORT"),
        )
}
