//! Rack adapter, for any non-Rails Rack application such as Sinatra

use super::{AdapterDescriptor, AdapterId, DetectionRule, WebCommandPlan, DISPATCHER_PROCESS};

pub fn descriptor() -> AdapterDescriptor {
    AdapterDescriptor::new(AdapterId::Rack)
        .extends(AdapterId::Ruby)
        .detected_by(DetectionRule::any_version("rack"))
        .config_var("RACK_ENV", "production")
        .process_type("web", DISPATCHER_PROCESS)
        .web_command(
            WebCommandPlan::new("bundle exec rackup config.ru -p $PORT")
                .probe(
                    "thin",
                    "bundle exec thin start -R config.ru -e $RACK_ENV -p $PORT",
                )
                .probe("puma", "bundle exec puma -b tcp://0.0.0.0:$PORT"),
        )
}
