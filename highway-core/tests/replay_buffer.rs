use anyhow::Result;
use highway_core::{
    error::HighwayError,
    replay_buffer::{
        PerConfig, PrioritizedReplayBuffer, PrioritizedReplayBufferConfig, ReplayBuffer,
        ReplayBufferConfig, Transition,
    },
    ExperienceBufferBase, ReplayBufferBase,
};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn transition(i: usize) -> Transition {
    Transition::new(
        vec![i as f32, 0.0],
        i % 3,
        i as f32,
        vec![i as f32 + 1.0, 0.0],
        i % 5 == 4,
    )
}

fn per_buffer(capacity: usize, per: PerConfig) -> Result<PrioritizedReplayBuffer> {
    let config = PrioritizedReplayBufferConfig::default()
        .buffer(ReplayBufferConfig::default().capacity(capacity).seed(42))
        .per(per);
    Ok(PrioritizedReplayBuffer::build(&config)?)
}

#[test]
fn test_fifo_eviction() -> Result<()> {
    init();
    let config = ReplayBufferConfig::default().capacity(4);
    let mut buffer = ReplayBuffer::build(&config)?;
    let mut per = per_buffer(4, PerConfig::default())?;

    for i in 1..=5 {
        buffer.push(transition(i))?;
        per.push(transition(i))?;
    }

    let expected = (2..=5).map(transition).collect::<Vec<_>>();
    assert_eq!(buffer.len(), 4);
    assert_eq!(buffer.iter().cloned().collect::<Vec<_>>(), expected);
    assert_eq!(per.len(), 4);
    assert_eq!(per.iter().cloned().collect::<Vec<_>>(), expected);
    Ok(())
}

#[test]
fn test_capacity_invariant() -> Result<()> {
    init();
    let capacity = 7;
    let config = ReplayBufferConfig::default().capacity(capacity);
    let mut buffer = ReplayBuffer::build(&config)?;
    let mut per = per_buffer(capacity, PerConfig::default())?;

    for i in 0..30 {
        buffer.push(transition(i))?;
        per.push(transition(i))?;
        let n = (i + 1).min(capacity);
        assert_eq!(buffer.len(), n);
        assert_eq!(per.len(), n);
        assert_eq!(buffer.is_full(), i + 1 >= capacity);
        assert_eq!(per.is_full(), i + 1 >= capacity);

        let expected = ((i + 1 - n)..=i).map(transition).collect::<Vec<_>>();
        assert_eq!(buffer.iter().cloned().collect::<Vec<_>>(), expected);
        assert_eq!(per.iter().cloned().collect::<Vec<_>>(), expected);
    }
    Ok(())
}

#[test]
fn test_uniform_sampling_coverage() -> Result<()> {
    init();
    let config = ReplayBufferConfig::default().capacity(10).seed(123);
    let mut buffer = ReplayBuffer::build(&config)?;
    for i in 0..3 {
        buffer.push(transition(i))?;
    }

    let n = 10_000;
    let mut counts = [0usize; 3];
    for _ in 0..n {
        let batch = buffer.sample(1)?;
        counts[batch.transitions[0].state[0] as usize] += 1;
    }
    for c in counts.iter() {
        let freq = *c as f32 / n as f32;
        assert!((freq - 1.0 / 3.0).abs() < 0.03, "{:?}", counts);
    }
    Ok(())
}

#[test]
fn test_insufficient_data() -> Result<()> {
    init();
    let config = ReplayBufferConfig::default().capacity(10);
    let mut buffer = ReplayBuffer::build(&config)?;
    let mut per = per_buffer(10, PerConfig::default())?;
    for i in 0..3 {
        buffer.push(transition(i))?;
        per.push(transition(i))?;
    }

    assert!(matches!(
        buffer.sample(5),
        Err(HighwayError::InsufficientData {
            requested: 5,
            available: 3
        })
    ));
    assert!(matches!(per.sample(5), Err(e) if e.is_insufficient_data()));
    assert!(buffer.batch(5).is_err());
    Ok(())
}

#[test]
fn test_priority_proportional_sampling() -> Result<()> {
    init();
    let mut buffer = per_buffer(4, PerConfig::default().alpha(1.0))?;
    buffer.push_with_priority(transition(0), 1.0)?;
    buffer.push_with_priority(transition(1), 9.0)?;

    let n = 20_000;
    let mut counts = [0usize; 2];
    for _ in 0..n {
        let batch = buffer.sample(1)?;
        counts[batch.transitions[0].state[0] as usize] += 1;
    }
    let freq = counts[0] as f32 / n as f32;
    assert!((freq - 0.1).abs() < 0.02, "{:?}", counts);
    Ok(())
}

#[test]
fn test_alpha_zero_is_uniform() -> Result<()> {
    init();
    let mut buffer = per_buffer(4, PerConfig::default().alpha(0.0))?;
    buffer.push_with_priority(transition(0), 1.0)?;
    buffer.push_with_priority(transition(1), 100.0)?;

    let n = 10_000;
    let mut count = 0;
    for _ in 0..n {
        if buffer.sample(1)?.transitions[0].state[0] == 0.0 {
            count += 1;
        }
    }
    assert!((count as f32 / n as f32 - 0.5).abs() < 0.03);
    Ok(())
}

#[test]
fn test_importance_weight_normalization() -> Result<()> {
    init();
    let mut buffer = per_buffer(64, PerConfig::default().beta_start(0.7))?;
    for i in 0..50 {
        buffer.push_with_priority(transition(i), 0.1 + i as f32)?;
    }

    for _ in 0..100 {
        let batch = buffer.sample(16)?;
        let ws = batch.weight.unwrap_or_default();
        assert_eq!(ws.len(), 16);
        let w_max = ws.iter().fold(0f32, |m, &w| m.max(w));
        assert!((w_max - 1.0).abs() < 1e-6);
        assert!(ws.iter().all(|&w| w > 0.0 && w <= 1.0));
    }
    Ok(())
}

#[test]
fn test_priority_update_round_trip() -> Result<()> {
    init();
    let mut buffer = per_buffer(4, PerConfig::default().alpha(1.0))?;
    buffer.push(transition(0))?;
    assert_eq!(buffer.max_priority(), 1.0);

    let batch = buffer.sample(1)?;
    let ixs = batch.ix_sample.unwrap_or_default();
    buffer.update_priorities(&ixs, &[5.0])?;
    assert_eq!(buffer.max_priority(), 5.0);

    buffer.push_with_priority(transition(1), 1.0)?;
    let prob = buffer.priority(0).unwrap_or_default() / buffer.total_priority();
    assert!((prob - 5.0 / 6.0).abs() < 1e-6);

    let n = 10_000;
    let mut count = 0;
    for _ in 0..n {
        if buffer.sample(1)?.transitions[0].state[0] == 0.0 {
            count += 1;
        }
    }
    assert!((count as f32 / n as f32 - 5.0 / 6.0).abs() < 0.02);
    Ok(())
}

#[test]
fn test_stale_index() -> Result<()> {
    init();
    let mut buffer = per_buffer(2, PerConfig::default())?;
    buffer.push(transition(0))?;
    buffer.push(transition(1))?;
    let ixs = buffer.sample(2)?.ix_sample.unwrap_or_default();

    buffer.push(transition(2))?;
    buffer.push(transition(3))?;
    let res = buffer.update_priorities(&ixs, &[3.0, 3.0]);
    assert!(matches!(res, Err(HighwayError::StaleIndex { .. })));
    assert_eq!(buffer.max_priority(), 1.0);

    let ixs = buffer.sample(2)?.ix_sample.unwrap_or_default();
    buffer.update_priorities(&ixs, &[3.0, 3.0])?;
    assert_eq!(buffer.max_priority(), 3.0);
    Ok(())
}
