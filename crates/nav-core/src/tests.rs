//! Unit tests for nav-core primitives.

#[cfg(test)]
mod ids {
    use crate::{EdgeId, LocationId, NodeId, TravelerId};

    #[test]
    fn index_roundtrip() {
        let id = NodeId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(NodeId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn ordering() {
        assert!(NodeId(0) < NodeId(1));
        assert!(EdgeId(100) > EdgeId(99));
        assert!(LocationId::from("a-ford") < LocationId::from("b-mill"));
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(NodeId::INVALID.0, u32::MAX);
        assert_eq!(EdgeId::INVALID.0, u32::MAX);
        assert_eq!(NodeId::default(), NodeId::INVALID);
    }

    #[test]
    fn display() {
        assert_eq!(NodeId(7).to_string(), "NodeId(7)");
        assert_eq!(LocationId::new("old-mill").to_string(), "old-mill");
        assert_eq!(TravelerId::from("1234").as_str(), "1234");
    }
}

#[cfg(test)]
mod config {
    use crate::NavConfig;

    #[test]
    fn default_matches_game_balance() {
        let cfg = NavConfig::default();
        assert_eq!(cfg.max_stamina, 100);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_stamina_cap_rejected() {
        let cfg = NavConfig { max_stamina: 0, ..NavConfig::default() };
        assert!(cfg.validate().is_err());
    }
}
