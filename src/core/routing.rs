use super::eval::check_counts;
use super::{Instance, JobTimeline, Operation, Result, Schedule};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Simulates jobs following their own machine visiting order (open/job-shop routes).
///
/// Whenever a machine or a job is released, jobs are examined in `priority` order and each
/// job whose next machine is free starts its next operation immediately. Jobs are not required
/// to keep the same order on every machine. For instances without a processing order every
/// job is routed through the machines in index order.
///
/// # Errors
/// - If `priority` is empty, repeats a job or contains an unknown job.
pub fn simulate_routes(instance: &Instance, priority: &[usize]) -> Result<Schedule> {
    check_counts(instance, priority, priority.len(), 1)?;
    instance.validate_sequence(priority)?;

    let routes: Vec<Vec<usize>> = priority.iter().map(|&job| instance.route(job).collect()).collect();
    let mut operations: Vec<Vec<Operation>> = routes
        .iter()
        .map(|route| Vec::with_capacity(route.len()))
        .collect();
    let mut job_free = vec![0; priority.len()];
    let mut machine_free = vec![0; instance.count_machines()];

    let mut events = BinaryHeap::from([Reverse(0)]);

    while let Some(Reverse(now)) = events.pop() {
        while events.peek() == Some(&Reverse(now)) {
            events.pop();
        }

        for (position, route) in routes.iter().enumerate() {
            let Some(&machine) = route.get(operations[position].len()) else {
                continue;
            };

            if job_free[position] > now || machine_free[machine] > now {
                continue;
            }

            let end = now + instance.time(priority[position], machine);
            operations[position].push(Operation::new(machine, now, end));
            job_free[position] = end;
            machine_free[machine] = end;
            events.push(Reverse(end));
        }
    }

    let timelines = priority
        .iter()
        .zip(operations)
        .map(|(&job, operations)| JobTimeline { job, operations })
        .collect();

    Ok(Schedule::new(timelines))
}
