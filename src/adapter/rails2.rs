//! Rails 2.x adapter

use super::{AdapterDescriptor, AdapterId, DetectionRule, WebCommandPlan, DISPATCHER_PROCESS};

pub fn descriptor() -> AdapterDescriptor {
    AdapterDescriptor::new(AdapterId::Rails2)
        .extends(AdapterId::Rack)
        .detected_by(DetectionRule::version_range("rails", (2, 0, 0), (3, 0, 0)))
        .config_var("RAILS_ENV", "production")
        .config_var("RACK_ENV", "production")
        .process_type("web", DISPATCHER_PROCESS)
        .process_type("worker", "bundle exec rake jobs:work")
        .process_type("console", "bundle exec script/console")
        .addon("heroku-postgresql:dev")
        .web_command(
            WebCommandPlan::new("bundle exec ruby script/server -p $PORT")
                .probe("thin", "bundle exec thin start -e $RACK_ENV -S $SOCK")
                .probe("puma", "bundle exec puma -b unix://$SOCK"),
        )
}
