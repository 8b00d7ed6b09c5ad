crate::define_id_enum! {
    /// Adapter identifier
    AdapterId {
        Ruby => "ruby" : "Ruby",
        Rack => "rack" : "Ruby/Rack",
        Rails2 => "rails2" : "Ruby/Rails",
        Rails3 => "rails3" : "Ruby/Rails",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_id_serialization() {
        assert_eq!(serde_json::to_string(&AdapterId::Rails3).unwrap(), "\"rails3\"");
        assert_eq!(serde_json::to_string(&AdapterId::Rack).unwrap(), "\"rack\"");
    }

    #[test]
    fn test_adapter_id_name() {
        assert_eq!(AdapterId::Rack.name(), "Ruby/Rack");
        assert_eq!(AdapterId::Rails2.name(), "Ruby/Rails");
        assert_eq!(AdapterId::Rails3.to_string(), "rails3");
    }

    #[test]
    fn test_custom_adapter_round_trip() {
        let deserialized: AdapterId = serde_json::from_str("\"sinatra\"").unwrap();
        assert_eq!(deserialized, AdapterId::Custom("sinatra".to_string()));
        assert_eq!(serde_json::to_string(&deserialized).unwrap(), "\"sinatra\"");
    }

    #[test]
    fn test_all_variants_excludes_custom() {
        assert_eq!(AdapterId::all_variants().len(), 4);
        assert_eq!(AdapterId::from_str_lossy("rails2"), AdapterId::Rails2);
    }
}
