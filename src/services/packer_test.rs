#[cfg(test)]
mod packer_tests {
    use chrono::{Duration, TimeZone, Utc};

    use crate::models::calendar::CalendarBlock;
    use crate::models::run::RunConfig;
    use crate::models::task::LeadTask;
    use crate::services::packer::pack;

    fn block(id: &str, start_hour: u32, start_min: u32, end_hour: u32, end_min: u32) -> CalendarBlock {
        CalendarBlock {
            id: id.to_string(),
            summary: format!("Blind Invite {}", id),
            start_time: Utc
                .with_ymd_and_hms(2025, 4, 1, start_hour, start_min, 0)
                .unwrap(),
            end_time: Utc
                .with_ymd_and_hms(2025, 4, 1, end_hour, end_min, 0)
                .unwrap(),
        }
    }

    fn task(n: usize) -> LeadTask {
        LeadTask {
            id: format!("task_{}", n),
            text: "Send Calendar Invitation".to_string(),
            lead_id: format!("lead_{}", n),
            company_name: format!("Company {}", n),
            contact_name: format!("Contact {}", n),
            contact_firstname: "Contact".to_string(),
            contact_lastname: format!("{}", n),
            contact_lastinitial: "C.".to_string(),
            contact_email: format!("contact{}@example.test", n),
        }
    }

    fn tasks(count: usize) -> Vec<LeadTask> {
        (0..count).map(task).collect()
    }

    fn cfg(meeting_length_minutes: i64, leads_per_block: u32) -> RunConfig {
        RunConfig {
            meeting_length_minutes,
            leads_per_block,
            block_query: "Blind Invite".to_string(),
        }
    }

    #[test]
    fn test_pack_fills_consecutive_slots() {
        // 12 leads into one 60-minute block at 15 minutes, 6 per slot:
        // two slots of 6, back to back.
        let blocks = vec![block("b1", 9, 0, 10, 0)];
        let leads = tasks(12);

        let assignments = pack(&blocks, &leads, &cfg(15, 6));
        assert_eq!(assignments.len(), 12);

        let slot1_start = blocks[0].start_time;
        let slot2_start = slot1_start + Duration::minutes(15);

        for assignment in &assignments[..6] {
            assert_eq!(assignment.slot.start_time, slot1_start);
            assert_eq!(assignment.slot.end_time, slot2_start);
        }
        for assignment in &assignments[6..] {
            assert_eq!(assignment.slot.start_time, slot2_start);
            assert_eq!(assignment.slot.end_time, slot2_start + Duration::minutes(15));
        }
    }

    #[test]
    fn test_pack_preserves_lead_order() {
        let blocks = vec![block("b1", 9, 0, 11, 0)];
        let leads = tasks(5);

        let assignments = pack(&blocks, &leads, &cfg(30, 2));

        let ids: Vec<&str> = assignments.iter().map(|a| a.task.id.as_str()).collect();
        assert_eq!(ids, vec!["task_0", "task_1", "task_2", "task_3", "task_4"]);
    }

    #[test]
    fn test_pack_assigns_each_lead_at_most_once() {
        let blocks = vec![block("b1", 9, 0, 12, 0)];
        let leads = tasks(8);

        let assignments = pack(&blocks, &leads, &cfg(15, 3));

        let mut ids: Vec<&str> = assignments.iter().map(|a| a.task.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), assignments.len());
    }

    #[test]
    fn test_pack_never_exceeds_block_end() {
        // A 50-minute block holds three full 15-minute slots; the last 5
        // minutes stay unused.
        let blocks = vec![block("b1", 9, 0, 9, 50)];
        let leads = tasks(10);

        let assignments = pack(&blocks, &leads, &cfg(15, 1));
        assert_eq!(assignments.len(), 3);

        for assignment in &assignments {
            assert!(assignment.slot.end_time <= blocks[0].end_time);
        }
    }

    #[test]
    fn test_pack_spills_into_next_block() {
        let blocks = vec![block("b1", 9, 0, 9, 30), block("b2", 14, 0, 14, 30)];
        let leads = tasks(3);

        let assignments = pack(&blocks, &leads, &cfg(15, 1));
        assert_eq!(assignments.len(), 3);

        assert_eq!(assignments[0].block_label, "Blind Invite b1");
        assert_eq!(assignments[1].block_label, "Blind Invite b1");
        assert_eq!(assignments[2].block_label, "Blind Invite b2");
        assert_eq!(assignments[2].slot.start_time, blocks[1].start_time);
    }

    #[test]
    fn test_pack_leftover_leads_stay_unassigned() {
        // One 60-minute block at 15 minutes and one lead per slot holds 4
        // leads; the fifth is left over without panicking.
        let blocks = vec![block("b1", 9, 0, 10, 0)];
        let leads = tasks(5);

        let assignments = pack(&blocks, &leads, &cfg(15, 1));
        assert_eq!(assignments.len(), 4);
        assert!(assignments.iter().all(|a| a.task.id != "task_4"));
    }

    #[test]
    fn test_pack_leftover_capacity_stays_unused() {
        let blocks = vec![block("b1", 9, 0, 12, 0)];
        let leads = tasks(1);

        let assignments = pack(&blocks, &leads, &cfg(30, 4));
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].slot.start_time, blocks[0].start_time);
    }

    #[test]
    fn test_pack_uneven_final_slot() {
        // 7 leads at 3 per slot: slots of 3, 3, and 1.
        let blocks = vec![block("b1", 9, 0, 10, 0)];
        let leads = tasks(7);

        let assignments = pack(&blocks, &leads, &cfg(15, 3));
        assert_eq!(assignments.len(), 7);

        let third_slot_start = blocks[0].start_time + Duration::minutes(30);
        let in_third_slot: Vec<_> = assignments
            .iter()
            .filter(|a| a.slot.start_time == third_slot_start)
            .collect();
        assert_eq!(in_third_slot.len(), 1);
        assert_eq!(in_third_slot[0].task.id, "task_6");
    }

    #[test]
    fn test_pack_no_blocks() {
        let assignments = pack(&[], &tasks(3), &cfg(15, 1));
        assert!(assignments.is_empty());
    }

    #[test]
    fn test_pack_no_leads() {
        let blocks = vec![block("b1", 9, 0, 10, 0)];
        let assignments = pack(&blocks, &[], &cfg(15, 1));
        assert!(assignments.is_empty());
    }

    #[test]
    fn test_pack_is_deterministic() {
        let blocks = vec![block("b1", 9, 0, 10, 30), block("b2", 13, 0, 14, 0)];
        let leads = tasks(9);
        let config = cfg(20, 2);

        let first = pack(&blocks, &leads, &config);
        let second = pack(&blocks, &leads, &config);
        assert_eq!(first, second);
    }

    #[test]
    fn test_pack_slots_share_identical_window_per_group() {
        let blocks = vec![block("b1", 9, 0, 10, 0)];
        let leads = tasks(4);

        let assignments = pack(&blocks, &leads, &cfg(30, 2));

        // Leads sharing a slot share the exact same start and end.
        assert_eq!(assignments[0].slot, assignments[1].slot);
        assert_eq!(assignments[2].slot, assignments[3].slot);
        assert_ne!(assignments[0].slot, assignments[2].slot);
    }
}
