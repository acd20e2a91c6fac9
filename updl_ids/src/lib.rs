pub mod ids;

pub use ids::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_ids_are_deterministic() {
        let a = SequentialIdGenerator::new();
        let b = SequentialIdGenerator::new();
        assert_eq!(a.next_id("entity"), b.next_id("entity"));
        assert_eq!(a.next_id("entity"), "entity_2");
        assert_eq!(a.next_id("component"), "component_3");
    }

    #[test]
    fn sequential_ids_can_start_anywhere() {
        let ids = SequentialIdGenerator::starting_at(41);
        assert_eq!(ids.next_id("light"), "light_41");
        assert_eq!(ids.next_id("light"), "light_42");
    }

    #[test]
    fn random_ids_keep_prefix_and_differ() {
        let ids = RandomIdGenerator;
        let a = ids.next_id("entity");
        let b = ids.next_id("entity");
        assert!(a.starts_with("entity_"));
        assert_ne!(a, b);
    }

    #[test]
    fn random_ids_are_identifier_safe() {
        let id = RandomIdGenerator.next_id("ship");
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
    }

    #[test]
    fn shared_generator_forwards() {
        let shared = shared(SequentialIdGenerator::new());
        assert_eq!(shared.next_id("space"), "space_1");
        let clone = shared.clone();
        assert_eq!(clone.next_id("space"), "space_2");
    }
}
